use std::{panic::AssertUnwindSafe, sync::mpsc};

use tracing::{debug, error};

use super::ai_pose::{PoseService, SynthesizedPose};

/// Runs pose synthesis on worker threads. Only the result of the most recent request is ever
/// returned; responses to earlier requests that arrive late are dropped.
pub struct PoseRequests {
    service: PoseService,

    sender: mpsc::Sender<(u64, SynthesizedPose)>,
    receiver: mpsc::Receiver<(u64, SynthesizedPose)>,

    /// Sequence number of the last request issued.
    latest: u64,
    /// Sequence number of the last request whose result was delivered.
    completed: u64,
}

impl PoseRequests {
    pub fn new(service: PoseService) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            service,
            sender,
            receiver,
            latest: 0,
            completed: 0,
        }
    }

    /// Start synthesizing a pose for `prompt`. Blank prompts are ignored. Returns the sequence
    /// number of the new request.
    pub fn submit(&mut self, prompt: &str) -> Option<u64> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return None;
        }

        self.latest += 1;
        let seq = self.latest;

        let service = self.service.clone();
        let sender = self.sender.clone();
        let prompt = prompt.to_owned();

        let spawned = std::thread::Builder::new()
            .name(format!("pose-request-{seq}"))
            .spawn(move || {
                // A panicking backend still has to answer, otherwise the request stays busy.
                let pose =
                    std::panic::catch_unwind(AssertUnwindSafe(|| service.synthesize(&prompt)))
                        .unwrap_or_else(|_| {
                            error!("Pose request {seq} panicked, using the rest pose");
                            SynthesizedPose::fallback()
                        });
                // The receiver is gone when the application closed mid request.
                let _ = sender.send((seq, pose));
            });

        if let Err(err) = spawned {
            error!("Could not start pose request thread: {err}");
            // Nothing will ever answer this request.
            self.completed = seq;
            return None;
        }

        debug!("Submitted pose request {seq}");
        Some(seq)
    }

    /// Returns the pose for the latest request once it arrived.
    pub fn poll(&mut self) -> Option<SynthesizedPose> {
        let mut result = None;
        while let Ok((seq, pose)) = self.receiver.try_recv() {
            if seq == self.latest {
                self.completed = seq;
                result = Some(pose);
            } else {
                debug!(
                    "Dropping stale pose response {seq}, latest request is {}",
                    self.latest
                );
            }
        }
        result
    }

    /// True while the latest request has not been answered.
    pub fn is_busy(&self) -> bool {
        self.completed < self.latest
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::Arc,
        time::{Duration, Instant},
    };

    use super::*;
    use crate::studio::ai_pose::{AiError, PoseBackend};

    /// Answers with a body pose holding the length of the prompt.
    struct Echo;

    impl PoseBackend for Echo {
        fn generate(&self, prompt: &str) -> Result<SynthesizedPose, AiError> {
            Ok(SynthesizedPose {
                body_pose: vec![prompt.len() as f32],
                expression: None,
            })
        }
    }

    struct Panicking;

    impl PoseBackend for Panicking {
        fn generate(&self, _prompt: &str) -> Result<SynthesizedPose, AiError> {
            panic!("backend blew up");
        }
    }

    fn wait_for(requests: &mut PoseRequests) -> SynthesizedPose {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = requests.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "no response from the worker");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn requests() -> PoseRequests {
        PoseRequests::new(PoseService::new(Arc::new(Echo)))
    }

    fn pose(value: f32) -> SynthesizedPose {
        SynthesizedPose {
            body_pose: vec![value],
            expression: None,
        }
    }

    #[test]
    fn blank_prompts_are_ignored() {
        let mut requests = requests();
        assert_eq!(requests.submit(""), None);
        assert_eq!(requests.submit("  \n\t"), None);
        assert!(!requests.is_busy());
    }

    #[test]
    fn result_arrives_from_the_worker() {
        let mut requests = requests();
        assert_eq!(requests.submit("  wave  "), Some(1));
        assert!(requests.is_busy());

        let result = wait_for(&mut requests);

        // The prompt is trimmed before it is sent.
        assert_eq!(result, pose(4.0));
        assert!(!requests.is_busy());
    }

    #[test]
    fn panicking_backend_answers_with_the_rest_pose() {
        let mut requests = PoseRequests::new(PoseService::new(Arc::new(Panicking)));
        assert_eq!(requests.submit("fall over"), Some(1));

        assert_eq!(wait_for(&mut requests), SynthesizedPose::fallback());
        assert!(!requests.is_busy());
    }

    #[test]
    fn stale_responses_are_dropped() {
        let mut requests = requests();
        requests.latest = 2;

        // The newer request finishes first.
        requests.sender.send((2, pose(2.0))).unwrap();
        assert_eq!(requests.poll(), Some(pose(2.0)));
        assert!(!requests.is_busy());

        // The older one arrives afterwards and is ignored.
        requests.sender.send((1, pose(1.0))).unwrap();
        assert_eq!(requests.poll(), None);
        assert!(!requests.is_busy());
    }

    #[test]
    fn only_the_latest_of_a_batch_is_returned() {
        let mut requests = requests();
        requests.latest = 3;

        requests.sender.send((1, pose(1.0))).unwrap();
        requests.sender.send((3, pose(3.0))).unwrap();
        requests.sender.send((2, pose(2.0))).unwrap();
        assert_eq!(requests.poll(), Some(pose(3.0)));
    }

    #[test]
    fn busy_until_the_latest_arrives() {
        let mut requests = requests();
        requests.latest = 2;

        requests.sender.send((1, pose(1.0))).unwrap();
        assert_eq!(requests.poll(), None);
        assert!(requests.is_busy());
    }
}
