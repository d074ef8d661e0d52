//! Control commands for the selection engine.

use shuffler_core::command::Command;
use uuid::Uuid;

/// Command to shuffle the displayed pool.
#[derive(Debug, Clone)]
pub struct ShuffleDisplay {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for ShuffleDisplay {
    fn command_type(&self) -> &'static str {
        "shuffler.shuffle_display"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to draw and reveal three prizes.
#[derive(Debug, Clone)]
pub struct PickPrizes {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for PickPrizes {
    fn command_type(&self) -> &'static str {
        "shuffler.pick_prizes"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to hand the finished draw to the results sink.
#[derive(Debug, Clone)]
pub struct SaveResults {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for SaveResults {
    fn command_type(&self) -> &'static str {
        "shuffler.save_results"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to cancel all activity and restore the initial pool.
#[derive(Debug, Clone)]
pub struct Reset {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for Reset {
    fn command_type(&self) -> &'static str {
        "shuffler.reset"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
