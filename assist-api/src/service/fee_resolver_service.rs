use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::fee::{Discriminators, FeeQueryContext, FeeResult, ProductLine};

/// Fee Resolver: deterministic, effective-date-aware rule evaluation
/// over a single master table per product line.
#[async_trait]
pub trait FeeResolver: Send + Sync {
    async fn resolve(
        &self,
        product_line: ProductLine,
        discriminators: Discriminators,
        as_of_date: NaiveDate,
        context: FeeQueryContext,
    ) -> FeeResult;
}
