use std::fs::File;
use std::io::BufWriter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use super::device::{CaptureDevice, CaptureSettings, DeviceError};

type SharedWriter = Arc<Mutex<Option<hound::WavWriter<BufWriter<File>>>>>;

/// Microphone capture device backed by cpal, encoding 16-bit PCM WAV via
/// hound.
///
/// cpal streams are not `Send`, so the stream lives on a dedicated capture
/// thread. The device communicates with it through atomic flags: `paused`
/// gates the audio callback (paused intervals produce no samples, so the
/// output timeline contains no dead air) and `shutdown` ends the session.
pub struct MicCaptureDevice {
    settings: Option<CaptureSettings>,
    paused: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<Result<(), DeviceError>>>,
}

impl MicCaptureDevice {
    pub fn new() -> Self {
        Self {
            settings: None,
            paused: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    fn join_worker(&mut self) -> Result<(), DeviceError> {
        match self.worker.take() {
            None => Ok(()),
            Some(handle) => match handle.join() {
                Ok(result) => result,
                Err(_) => Err(DeviceError::Io("capture thread panicked".to_string())),
            },
        }
    }
}

impl Default for MicCaptureDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MicCaptureDevice {
    fn drop(&mut self) {
        // Release: a dropped device must not leak its capture thread or
        // leave an unfinalized WAV behind.
        self.shutdown.store(true, Ordering::Release);
        if let Err(e) = self.join_worker() {
            warn!("capture worker error during release: {}", e);
        }
    }
}

#[async_trait::async_trait]
impl CaptureDevice for MicCaptureDevice {
    fn configure(&mut self, settings: &CaptureSettings) -> Result<(), DeviceError> {
        if self.worker.is_some() {
            return Err(DeviceError::IllegalState("configure while capturing"));
        }
        self.settings = Some(settings.clone());
        Ok(())
    }

    async fn start(&mut self) -> Result<(), DeviceError> {
        if self.worker.is_some() {
            return Err(DeviceError::IllegalState("start while already capturing"));
        }
        let settings = self
            .settings
            .clone()
            .ok_or(DeviceError::IllegalState("start before configure"))?;

        self.shutdown.store(false, Ordering::Release);
        self.paused.store(false, Ordering::Release);

        let (ready_tx, ready_rx) = oneshot::channel();
        let paused = Arc::clone(&self.paused);
        let shutdown = Arc::clone(&self.shutdown);

        let handle = std::thread::Builder::new()
            .name("audiolog-capture".to_string())
            .spawn(move || run_capture(settings, paused, shutdown, ready_tx))
            .map_err(|e| DeviceError::Io(format!("failed to spawn capture thread: {}", e)))?;
        self.worker = Some(handle);

        // Bounded by the OS stream startup; the thread signals once the
        // stream is playing or reports why it could not. The failure-path
        // joins below are immediate, the thread has already exited.
        match ready_rx.await {
            Ok(Ok(())) => {
                info!("microphone capture started");
                Ok(())
            }
            Ok(Err(e)) => {
                if let Err(join_err) = self.join_worker() {
                    warn!("capture thread exit after failed start: {}", join_err);
                }
                Err(e)
            }
            Err(_) => {
                if let Err(join_err) = self.join_worker() {
                    warn!("capture thread exit after failed start: {}", join_err);
                }
                Err(DeviceError::Io(
                    "capture thread exited before signaling readiness".to_string(),
                ))
            }
        }
    }

    async fn pause(&mut self) -> Result<(), DeviceError> {
        if self.worker.is_none() {
            return Err(DeviceError::IllegalState("pause while idle"));
        }
        self.paused.store(true, Ordering::Release);
        Ok(())
    }

    async fn resume(&mut self) -> Result<(), DeviceError> {
        if self.worker.is_none() {
            return Err(DeviceError::IllegalState("resume while idle"));
        }
        self.paused.store(false, Ordering::Release);
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), DeviceError> {
        let Some(handle) = self.worker.take() else {
            return Err(DeviceError::IllegalState("stop while idle"));
        };
        self.shutdown.store(true, Ordering::Release);
        // The worker finalizes the WAV on its way out; join off the async
        // runtime so a slow flush never stalls an executor thread.
        match tokio::task::spawn_blocking(move || handle.join()).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(DeviceError::Io("capture thread panicked".to_string())),
            Err(e) => Err(DeviceError::Io(format!(
                "failed to join capture thread: {}",
                e
            ))),
        }
    }

    fn reset(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        if let Err(e) = self.join_worker() {
            warn!("capture worker error during reset: {}", e);
        }
        self.paused.store(false, Ordering::Release);
        self.settings = None;
    }

    fn supports_pause(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "cpal-microphone"
    }
}

/// Capture thread body: owns the cpal stream, parks until shutdown, then
/// finalizes the WAV output.
fn run_capture(
    settings: CaptureSettings,
    paused: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    ready_tx: oneshot::Sender<Result<(), DeviceError>>,
) -> Result<(), DeviceError> {
    match build_stream(&settings, &paused, &shutdown) {
        Ok((stream, writer)) => {
            let _ = ready_tx.send(Ok(()));
            while !shutdown.load(Ordering::Acquire) {
                std::thread::sleep(Duration::from_millis(25));
            }
            drop(stream);
            finalize(&writer)
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e.clone()));
            Err(e)
        }
    }
}

fn build_stream(
    settings: &CaptureSettings,
    paused: &Arc<AtomicBool>,
    shutdown: &Arc<AtomicBool>,
) -> Result<(cpal::Stream, SharedWriter), DeviceError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| DeviceError::Io("no default input device".to_string()))?;
    let supported = device
        .default_input_config()
        .map_err(|e| DeviceError::Io(format!("no default input config: {}", e)))?;
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();

    if config.sample_rate.0 != settings.sample_rate {
        warn!(
            "capture device runs at {} Hz, requested {} Hz",
            config.sample_rate.0, settings.sample_rate
        );
    }

    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate.0,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let writer = hound::WavWriter::create(&settings.output_path, spec).map_err(|e| match e {
        hound::Error::IoError(io) => DeviceError::classify_io(io),
        other => DeviceError::Io(format!("failed to create WAV output: {}", other)),
    })?;
    let writer: SharedWriter = Arc::new(Mutex::new(Some(writer)));

    let stream = match sample_format {
        cpal::SampleFormat::F32 => {
            let sink = Arc::clone(&writer);
            let paused = Arc::clone(paused);
            let shutdown = Arc::clone(shutdown);
            device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if shutdown.load(Ordering::Acquire) || paused.load(Ordering::Acquire) {
                        return;
                    }
                    write_samples(&sink, data.iter().map(|s| to_i16(*s)));
                },
                |e| error!("capture stream error: {}", e),
                None,
            )
        }
        cpal::SampleFormat::I16 => {
            let sink = Arc::clone(&writer);
            let paused = Arc::clone(paused);
            let shutdown = Arc::clone(shutdown);
            device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    if shutdown.load(Ordering::Acquire) || paused.load(Ordering::Acquire) {
                        return;
                    }
                    write_samples(&sink, data.iter().copied());
                },
                |e| error!("capture stream error: {}", e),
                None,
            )
        }
        other => {
            return Err(DeviceError::Unsupported(format!(
                "input sample format {:?}",
                other
            )))
        }
    }
    .map_err(|e| DeviceError::Io(format!("failed to build input stream: {}", e)))?;

    stream
        .play()
        .map_err(|e| DeviceError::Busy(format!("failed to start input stream: {}", e)))?;

    Ok((stream, writer))
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

fn write_samples(sink: &SharedWriter, samples: impl Iterator<Item = i16>) {
    // Recover from lock poison rather than dropping audio; the writer is
    // still valid even if a previous holder panicked.
    let mut guard = match sink.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(writer) = guard.as_mut() {
        for sample in samples {
            if let Err(e) = writer.write_sample(sample) {
                error!("failed to write sample: {}", e);
                break;
            }
        }
    }
}

fn finalize(writer: &SharedWriter) -> Result<(), DeviceError> {
    let mut guard = match writer.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(writer) = guard.take() {
        writer
            .finalize()
            .map_err(|e| DeviceError::Io(format!("failed to finalize WAV output: {}", e)))?;
    }
    Ok(())
}
