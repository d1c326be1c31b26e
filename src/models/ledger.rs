//! Sales and salaries are written by other services; this API only sums them.

pub const SALES_COLLECTION: &str = "sales";
pub const SALARIES_COLLECTION: &str = "salaries";

// field holding the document total in both collections
pub const TOTAL_AMOUNT_FIELD: &str = "totalAmount";
