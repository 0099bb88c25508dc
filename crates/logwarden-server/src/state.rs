use logwarden_runtime::AuditLogService;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: AuditLogService,
}

impl AppState {
    pub fn new(service: AuditLogService) -> Self {
        Self { service }
    }
}
