/// Events emitted while a batch of molecules is being resolved.
#[derive(Debug, Clone)]
pub enum Progress {
    /// A batch of `total_steps` molecules is starting.
    TaskStart { total_steps: u64 },
    /// One molecule finished, successfully or not.
    TaskIncrement,
    TaskFinish,

    /// A human-readable note, such as a molecule that failed.
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards [`Progress`] events to an optional callback. The callback may be
/// invoked from several worker threads at once.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}
