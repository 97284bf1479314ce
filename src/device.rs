use serde::Serialize;
use sysinfo::{CpuRefreshKind, System};
use uuid::Uuid;

/// Basic client metadata sent once with the session-open request.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceInfo {
    /// Random id for this agent run; lets the server correlate sessions
    /// from the same client without identifying the machine.
    pub client_id: String,
    pub hostname: Option<String>,
    pub os: Option<String>,
    pub os_version: Option<String>,
    pub cpu_count: usize,
    pub total_memory_mb: u64,
    pub agent_version: &'static str,
}

impl DeviceInfo {
    pub fn collect() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        system.refresh_cpu_list(CpuRefreshKind::new());

        Self {
            client_id: Uuid::new_v4().to_string(),
            hostname: System::host_name(),
            os: System::name(),
            os_version: System::os_version(),
            cpu_count: system.cpus().len().max(1),
            total_memory_mb: system.total_memory() / 1024 / 1024,
            agent_version: env!("CARGO_PKG_VERSION"),
        }
    }
}
