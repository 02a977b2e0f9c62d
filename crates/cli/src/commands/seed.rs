use storefront_db::{DemoDataset, SeedCheck, SeedResult};

use crate::commands::{open_migrated, prepare, CommandResult, StepFailure};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("seed") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result: Result<SeedResult, StepFailure> = runtime.block_on(async {
        let pool = open_migrated(&config).await?;

        let seeded = DemoDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;
        let verification = DemoDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;
        pool.close().await;

        if verification.all_present {
            Ok(seeded)
        } else {
            Err(("seed_verification", verification_message(&verification.checks), 6u8))
        }
    });

    match result {
        Ok(seeded) => CommandResult::success_with_data(
            "seed",
            summary(&seeded),
            serde_json::to_value(seeded).ok(),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn summary(seeded: &SeedResult) -> String {
    format!(
        "demo dataset loaded: {} customers, {} products, {} orders",
        seeded.customers, seeded.products, seeded.orders
    )
}

fn verification_message(checks: &[SeedCheck]) -> String {
    let failed: Vec<&str> =
        checks.iter().filter_map(|check| (!check.passed).then_some(check.name)).collect();
    if failed.is_empty() {
        "Some demo data failed to load".to_string()
    } else {
        format!("Demo data verification failed for checks: {}", failed.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use storefront_db::{SeedCheck, SeedResult};

    use super::{summary, verification_message};

    #[test]
    fn verification_message_names_failed_checks() {
        let checks = [
            SeedCheck { name: "customers", passed: true },
            SeedCheck { name: "orders", passed: false },
            SeedCheck { name: "order-lines", passed: false },
        ];

        assert_eq!(
            verification_message(&checks),
            "Demo data verification failed for checks: orders, order-lines"
        );
    }

    #[test]
    fn verification_message_falls_back_without_labels() {
        let checks = [SeedCheck { name: "customers", passed: true }];

        assert_eq!(verification_message(&checks), "Some demo data failed to load");
    }

    #[test]
    fn summary_counts_each_table() {
        let seeded = SeedResult { customers: 8, products: 18, orders: 27 };

        assert_eq!(summary(&seeded), "demo dataset loaded: 8 customers, 18 products, 27 orders");
    }
}
