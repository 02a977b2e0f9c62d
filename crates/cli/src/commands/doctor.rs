use std::time::Duration;

use serde::Serialize;
use storefront_core::config::{AppConfig, LoadOptions};
use storefront_core::prediction::PredictorHealth;
use storefront_db::{connect_with_settings, connection};

use crate::commands::CommandResult;

const PREDICTOR_HEALTH_PATH: &str = "api/ai/health";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
pub struct DoctorCheck {
    pub name: &'static str,
    pub status: CheckStatus,
    pub details: String,
}

#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub overall_status: CheckStatus,
    pub summary: String,
    pub checks: Vec<DoctorCheck>,
}

/// Readiness report. A predictor outage only warns, since the storefront
/// still serves insights and forecasts without it.
pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Fail { 1 } else { 0 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

pub fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            match tokio::runtime::Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => {
                    checks.push(runtime.block_on(check_database_connectivity(&config)));
                    checks.push(runtime.block_on(check_predictor(&config)));
                }
                Err(error) => {
                    for name in ["database_connectivity", "predictor_health"] {
                        checks.push(DoctorCheck {
                            name,
                            status: CheckStatus::Fail,
                            details: format!("failed to initialize async runtime: {error}"),
                        });
                    }
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["database_connectivity", "predictor_health"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let failed = checks
        .iter()
        .any(|check| matches!(check.status, CheckStatus::Fail | CheckStatus::Skipped));
    let warned = checks.iter().any(|check| check.status == CheckStatus::Warn);
    let (overall_status, summary) = if failed {
        (CheckStatus::Fail, "doctor: one or more readiness checks failed")
    } else if warned {
        (CheckStatus::Warn, "doctor: ready with warnings")
    } else {
        (CheckStatus::Pass, "doctor: all readiness checks passed")
    };

    DoctorReport { overall_status, summary: summary.to_string(), checks }
}

async fn check_database_connectivity(config: &AppConfig) -> DoctorCheck {
    let result = async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;
        let ping = connection::ping(&pool)
            .await
            .map_err(|error| format!("database query failed: {error}"));
        pool.close().await;
        ping
    }
    .await;

    match result {
        Ok(()) => DoctorCheck {
            name: "database_connectivity",
            status: CheckStatus::Pass,
            details: format!("connected using `{}`", config.database.url),
        },
        Err(error) => {
            DoctorCheck { name: "database_connectivity", status: CheckStatus::Fail, details: error }
        }
    }
}

async fn check_predictor(config: &AppConfig) -> DoctorCheck {
    let url = config.predictor.endpoint(PREDICTOR_HEALTH_PATH);
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(config.predictor.timeout_secs))
        .build()
    {
        Ok(client) => client,
        Err(error) => {
            return DoctorCheck {
                name: "predictor_health",
                status: CheckStatus::Fail,
                details: format!("failed to build http client: {error}"),
            };
        }
    };

    let probe = async {
        let response = client.get(&url).send().await.map_err(|error| error.to_string())?;
        if !response.status().is_success() {
            return Err(format!("status {}", response.status().as_u16()));
        }
        response.json::<PredictorHealth>().await.map_err(|error| error.to_string())
    };

    match probe.await {
        Ok(health) if health.is_healthy() => DoctorCheck {
            name: "predictor_health",
            status: CheckStatus::Pass,
            details: format!("predictor at `{url}` has its model loaded"),
        },
        Ok(health) => DoctorCheck {
            name: "predictor_health",
            status: CheckStatus::Warn,
            details: format!(
                "predictor at `{url}` reported `{}` (model_loaded={})",
                health.status, health.model_loaded
            ),
        },
        Err(error) => DoctorCheck {
            name: "predictor_health",
            status: CheckStatus::Warn,
            details: format!("predictor at `{url}` unreachable: {error}"),
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
