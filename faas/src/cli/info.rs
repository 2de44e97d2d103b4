//! info サブコマンド

use crate::config::{get_database_url, ExecutionConfig, ReconcileConfig, ServerConfig};

/// 有効な設定を表示用の行として返す
pub fn lines() -> Vec<String> {
    let server = ServerConfig::from_env();
    let execution = ExecutionConfig::from_env();
    let reconcile = ReconcileConfig::from_env();

    let or_disabled = |value: Option<String>| value.unwrap_or_else(|| "disabled".to_string());

    vec![
        format!("database_url:          {}", get_database_url()),
        format!("listen:                {}", server.bind_addr()),
        format!("url:                   {}", server.base_url()),
        format!("packages_dir:          {}", reconcile.packages_dir.display()),
        format!("package_manager:       {}", reconcile.package_manager),
        format!(
            "package_poll_interval: {}ms",
            reconcile.interval.as_millis()
        ),
        format!(
            "handler_timeout:       {}",
            or_disabled(execution.timeout.map(|t| format!("{}ms", t.as_millis())))
        ),
        format!(
            "handler_loop_limit:    {}",
            or_disabled(execution.loop_iteration_limit.map(|l| l.to_string()))
        ),
    ]
}

/// Execute the info command
pub fn execute() {
    for line in lines() {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_lines_show_disabled_limits() {
        std::env::remove_var("FAAS_HANDLER_TIMEOUT_MS");
        std::env::remove_var("HANDLER_TIMEOUT_MS");
        std::env::set_var("FAAS_DATABASE_URL", "sqlite:/tmp/info-test.db");

        let lines = lines();
        assert!(lines[0].ends_with("sqlite:/tmp/info-test.db"));
        assert!(lines
            .iter()
            .any(|l| l.starts_with("handler_timeout:") && l.ends_with("disabled")));

        std::env::remove_var("FAAS_DATABASE_URL");
    }
}
