use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

impl ServiceContext {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::resolve(
            component,
            env::var("SERVICE_NAME").ok(),
            env::var("STAGE").ok(),
        )
    }

    fn resolve(component: &str, service_name: Option<String>, stage: Option<String>) -> Self {
        let component = component.trim().to_string();

        let service_name = service_name
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| component.clone());

        let environment = stage
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            service_name,
            environment,
            component,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_name_falls_back_to_component() {
        let context = ServiceContext::resolve(" worker ", Some("  ".to_string()), None);
        assert_eq!(context.service_name, "worker");
        assert_eq!(context.component, "worker");
        assert_eq!(context.environment, "unknown");
    }

    #[test]
    fn explicit_values_win() {
        let context = ServiceContext::resolve(
            "backend",
            Some("author-dashboard".to_string()),
            Some("production".to_string()),
        );
        assert_eq!(context.service_name, "author-dashboard");
        assert_eq!(context.environment, "production");
    }
}
