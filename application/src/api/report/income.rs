//! [`Income`] report definition.

use common::{DateTime, Money};
use juniper::{graphql_object, GraphQLObject};
use service::{query, read};

use crate::{api, Context};

/// Report summing up the income collected via paid payments in a period.
#[derive(Clone, Debug)]
pub struct Income {
    /// Queried period.
    period: query::report::Income,

    /// [`Total`]s of this report, one per currency.
    totals: Vec<Total>,
}

impl Income {
    /// Creates a new [`Income`] report of the provided `period` out of the
    /// queried `totals`.
    #[must_use]
    pub fn new(
        period: query::report::Income,
        totals: Vec<read::income::Total>,
    ) -> Self {
        Self {
            period,
            totals: totals.into_iter().map(Into::into).collect(),
        }
    }
}

/// Report summing up the income collected via paid `Payment`s in a period.
#[graphql_object(name = "IncomeReport", context = Context)]
impl Income {
    /// Start of the report period, inclusive.
    #[must_use]
    pub fn start(&self) -> DateTime {
        self.period.start
    }

    /// End of the report period, inclusive.
    #[must_use]
    pub fn end(&self) -> DateTime {
        self.period.end
    }

    /// Collected income per currency.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "IncomeReport.totals",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    #[must_use]
    pub fn totals(&self) -> &[Total] {
        &self.totals
    }
}

/// Income collected in a single currency.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "IncomeTotal")]
pub struct Total {
    /// Sum of the collected `Payment`s.
    pub amount: Money,

    /// Number of the collected `Payment`s.
    pub payments_count: i32,
}

impl From<read::income::Total> for Total {
    fn from(total: read::income::Total) -> Self {
        Self {
            amount: total.amount,
            payments_count: total.payments.into(),
        }
    }
}
