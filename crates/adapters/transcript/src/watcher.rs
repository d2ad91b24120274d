//! Transcript file polling loop.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use porchlight_app::ports::{DeviceRegistry, DeviceTransport};
use porchlight_app::services::dispatcher::CommandDispatcher;
use porchlight_domain::intent::Intent;
use porchlight_domain::transcript::detect_intent;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::target::Target;

/// Polls a transcript file and turns recognised phrases into dispatches.
pub struct TranscriptWatcher<G, T> {
    dispatcher: Arc<CommandDispatcher<G, T>>,
    path: PathBuf,
    poll_interval: Duration,
    target: Target,
    missing_reported: bool,
}

impl<G, T> TranscriptWatcher<G, T>
where
    G: DeviceRegistry + Sync,
    T: DeviceTransport + Sync,
{
    pub fn new(
        dispatcher: Arc<CommandDispatcher<G, T>>,
        path: impl Into<PathBuf>,
        poll_interval: Duration,
        target: Target,
    ) -> Self {
        Self {
            dispatcher,
            path: path.into(),
            poll_interval,
            target,
            missing_reported: false,
        }
    }

    async fn clear(&self) -> io::Result<()> {
        tokio::fs::write(&self.path, b"").await
    }

    /// Read the transcript once; on a recognised phrase dispatch it and
    /// clear the file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file exists but cannot be read or cleared.
    pub async fn scan(&mut self) -> io::Result<Option<Intent>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                self.missing_reported = false;
                content
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                if !self.missing_reported {
                    tracing::warn!(path = %self.path.display(), "transcript file does not exist yet");
                    self.missing_reported = true;
                }
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let Some(intent) = detect_intent(&content) else {
            return Ok(None);
        };
        tracing::info!(%intent, target = %self.target, "voice command recognised");
        self.dispatch(intent).await;
        self.clear().await?;
        Ok(Some(intent))
    }

    async fn dispatch(&self, intent: Intent) {
        match self.target {
            Target::All => match self.dispatcher.dispatch_all(intent).await {
                Ok(report) => {
                    if let Some(summary) = report.failure_summary() {
                        tracing::warn!(%summary, "voice command incomplete");
                    }
                }
                Err(err) => tracing::error!(error = %err, "voice command failed"),
            },
            Target::Address(address) => {
                if let Err(err) = self.dispatcher.dispatch_address(address, intent).await {
                    tracing::error!(%address, error = %err, "voice command failed");
                }
            }
        }
    }

    /// Clear the transcript, then poll until `shutdown` turns `true` or its
    /// sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        if let Err(err) = self.clear().await {
            tracing::warn!(path = %self.path.display(), error = %err, "unable to clear transcript");
        }

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(path = %self.path.display(), target = %self.target, "transcript watcher started");

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(err) = self.scan().await {
                        tracing::error!(path = %self.path.display(), error = %err, "unable to read transcript");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("transcript watcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use porchlight_app::ports::TransportError;
    use porchlight_app::services::dispatcher::DispatchPolicy;
    use porchlight_domain::device::{Device, DeviceKind};
    use porchlight_domain::error::PorchlightError;
    use std::sync::Mutex;

    struct OneDevice;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<Intent>>,
    }

    impl DeviceRegistry for OneDevice {
        async fn load(&self) -> Result<Vec<Device>, PorchlightError> {
            Ok(vec![
                Device::builder()
                    .name("Desk")
                    .address("10.0.0.176".parse().unwrap())
                    .kind(DeviceKind::TelnetServo)
                    .build()?,
            ])
        }
    }

    impl DeviceTransport for Recorder {
        async fn send(&self, _device: &Device, intent: Intent) -> Result<String, TransportError> {
            self.sent.lock().unwrap().push(intent);
            Ok(intent.servo_position().to_string())
        }
    }

    fn make_watcher(
        path: PathBuf,
        target: Target,
    ) -> (TranscriptWatcher<OneDevice, Arc<Recorder>>, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let dispatcher = Arc::new(CommandDispatcher::new(
            OneDevice,
            Arc::clone(&recorder),
            DispatchPolicy::default(),
        ));
        let watcher = TranscriptWatcher::new(dispatcher, path, Duration::from_secs(1), target);
        (watcher, recorder)
    }

    #[tokio::test(start_paused = true)]
    async fn should_dispatch_and_clear_when_phrase_spoken() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcription.txt");
        tokio::fs::write(&path, "okay so turn the Light, on. please")
            .await
            .unwrap();
        let (mut watcher, recorder) = make_watcher(path.clone(), Target::All);

        let detected = watcher.scan().await.unwrap();

        assert_eq!(detected, Some(Intent::On));
        assert_eq!(*recorder.sent.lock().unwrap(), [Intent::On]);
        assert!(tokio::fs::read_to_string(&path).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_leave_file_alone_without_phrase() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcription.txt");
        tokio::fs::write(&path, "the lighthouse keeper").await.unwrap();
        let (mut watcher, recorder) = make_watcher(path.clone(), Target::All);

        assert_eq!(watcher.scan().await.unwrap(), None);

        assert!(recorder.sent.lock().unwrap().is_empty());
        assert_eq!(
            tokio::fs::read_to_string(&path).await.unwrap(),
            "the lighthouse keeper"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_send_to_single_target_address() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcription.txt");
        tokio::fs::write(&path, "light off\n").await.unwrap();
        let target = Target::Address("10.0.0.176".parse().unwrap());
        let (mut watcher, recorder) = make_watcher(path, target);

        assert_eq!(watcher.scan().await.unwrap(), Some(Intent::Off));
        assert_eq!(*recorder.sent.lock().unwrap(), [Intent::Off]);
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_polling_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let (mut watcher, recorder) =
            make_watcher(dir.path().join("transcription.txt"), Target::All);

        assert_eq!(watcher.scan().await.unwrap(), None);
        assert_eq!(watcher.scan().await.unwrap(), None);
        assert!(recorder.sent.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_clear_stale_transcript_on_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcription.txt");
        tokio::fs::write(&path, "light on ").await.unwrap();
        let (watcher, recorder) = make_watcher(path.clone(), Target::All);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(watcher.run(shutdown_rx));
        tokio::time::sleep(Duration::from_millis(2500)).await;
        shutdown_tx.send_replace(true);
        handle.await.unwrap();

        assert!(recorder.sent.lock().unwrap().is_empty());
        assert!(tokio::fs::read_to_string(&path).await.unwrap().is_empty());
    }
}
