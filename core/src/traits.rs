use serde::{Deserialize, Serialize};

/// What a renderer sees of one server.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServerLoad {
    pub queue_len: usize,
    pub remaining_work: f64,
}

/// Read-only view of a farm for anything polling it between dispatches.
pub trait FarmInspector {
    fn time(&self) -> f64;
    fn jobs_handled(&self) -> u64;
    fn server_loads(&self) -> Vec<ServerLoad>;

    fn visual_snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "time": self.time(),
            "jobs_handled": self.jobs_handled(),
            "servers": self.server_loads(),
        })
    }
}
