use storefront_core::catalog::Catalog;
use storefront_core::demand::{DemandAggregator, DemandForecast};
use storefront_db::repositories::{
    OrderRepository, ProductRepository, SqlOrderRepository, SqlProductRepository,
};

use crate::commands::{open_migrated, prepare, CommandResult, StepFailure};

/// Store-wide demand forecast computed straight from the database.
pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("forecast") {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result: Result<DemandForecast, StepFailure> = runtime.block_on(async {
        let pool = open_migrated(&config).await?;
        let orders = SqlOrderRepository::new(pool.clone())
            .list_all()
            .await
            .map_err(|error| ("forecast_query", error.to_string(), 6u8))?;
        let products = SqlProductRepository::new(pool.clone())
            .list_all()
            .await
            .map_err(|error| ("forecast_query", error.to_string(), 6u8))?;
        pool.close().await;

        Ok(DemandAggregator::forecast(&orders, &Catalog::new(products)))
    });

    match result {
        Ok(forecast) => CommandResult::success_with_data(
            "forecast",
            format!(
                "{} categories from {} orders ({} season)",
                forecast.forecast.len(),
                forecast.total_orders,
                forecast.season.as_str()
            ),
            serde_json::to_value(&forecast).ok(),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("forecast", error_class, message, exit_code)
        }
    }
}
