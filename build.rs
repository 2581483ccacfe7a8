use std::path::{Path, PathBuf};

use naga::{
    Module,
    back::wgsl,
    valid::{Capabilities, ValidationFlags, Validator},
};
use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage, ShaderType,
};

fn main() {
    compile_shaders();
}

/// Modules other shaders import with `#import`.
const COMMON: &[&str] = &["src/studio/camera.wgsl"];

const SHADERS: &[&str] = &["src/engine/gizmos.wgsl", "src/studio/proxies.wgsl"];

fn compile_shaders() {
    COMMON
        .iter()
        .chain(SHADERS)
        .for_each(|path| println!("cargo:rerun-if-changed={path}"));

    let mut composer = Composer::default();

    for path in COMMON {
        add_support_shader(&mut composer, path);
    }

    let out_dir = std::env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let shaders_dir = PathBuf::from(out_dir).join("shaders");
    std::fs::create_dir_all(&shaders_dir).expect("Create OUT_DIR/shaders");

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());

    for path in SHADERS {
        let module = create_shader_module(&mut composer, path);

        let info = validator
            .validate(&module)
            .unwrap_or_else(|e| panic!("Validation failed for {path}:\n{e:#?}"));

        let Some(file_name) = Path::new(path).file_name() else {
            panic!("Shader path {path} has no file name");
        };
        let out_path = shaders_dir.join(file_name);

        let wgsl_text = wgsl::write_string(&module, &info, wgsl::WriterFlags::EXPLICIT_TYPES)
            .unwrap_or_else(|e| panic!("Could not write WGSL for {path}: {e}"));

        std::fs::write(&out_path, wgsl_text)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", out_path.display()));
    }
}

fn add_support_shader(composer: &mut Composer, path: impl AsRef<Path>) {
    let source = std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Could not read shader source {}", path.as_ref().display()));

    let result = composer.add_composable_module(ComposableModuleDescriptor {
        source: &source,
        file_path: &path.as_ref().display().to_string(),
        language: ShaderLanguage::Wgsl,
        as_name: None,
        ..Default::default()
    });

    if let Err(e) = result {
        let msg = e.emit_to_string(composer);
        panic!(
            "Could not register module {}: {msg}",
            path.as_ref().display()
        );
    }
}

fn create_shader_module(composer: &mut Composer, path: impl AsRef<Path>) -> Module {
    let source = std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Could not read shader source {}", path.as_ref().display()));

    match composer.make_naga_module(NagaModuleDescriptor {
        source: &source,
        file_path: &path.as_ref().display().to_string(),
        shader_type: ShaderType::Wgsl,
        ..Default::default()
    }) {
        Ok(m) => m,
        Err(err) => {
            let msg = err.emit_to_string(composer);
            panic!(
                "Could not compose shader {}:\n{msg}",
                path.as_ref().display()
            );
        }
    }
}
