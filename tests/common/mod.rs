//! Shared fixture: a temporary resources directory

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use focus_catalog::CatalogConfig;
use tempfile::TempDir;

pub const COLUMNS: &str = r#"
- column_id: BilledCost
  display_name: Billed Cost
  description: A charge serving as the basis for invoicing
  introduced_version: "1.0"
  data_type: Decimal
  feature_level: Mandatory
  column_type: Metric
  allows_nulls: false
- column_id: ServiceName
  display_name: Service Name
  description: An offering that can be purchased from a provider
  introduced_version: "1.0"
  data_type: String
  feature_level: Mandatory
  column_type: Dimension
- column_id: CommitmentDiscountQuantity
  display_name: Commitment Discount Quantity
  description: Amount of a commitment discount purchased or accounted for
  introduced_version: "1.1"
  data_type: Decimal
  feature_level: Conditional
  column_type: Metric
- column_id: InvoiceId
  display_name: Invoice ID
  description: Provider-assigned identifier for an invoice
  introduced_version: "1.2"
  data_type: String
  feature_level: Recommended
  column_type: Dimension
- column_id: ContractApplied
  display_name: Contract Applied
  description: Contract commitments applied to a charge
  introduced_version: "1.3-preview"
  data_type: JSON
  feature_level: Conditional
  column_type: Dimension
"#;

pub const ATTRIBUTES: &str = r#"
- attribute_id: unit_format
  name: Unit Format
  description: Standard format for units of measure
  introduced_version: "1.0"
  requirements:
    - Units SHOULD use the standard format
- attribute_id: currency_code_format
  name: Currency Code Format
  description: ISO 4217 currency codes
  introduced_version: "1.2"
"#;

pub const TEMPLATES: &str = r#"
cost_by_service:
  name: Cost by Service
  description: Effective cost per service for a billing period
  slug: services-cost
  focus_versions: ["1.0", "1.1", "1.2"]
  citation: https://focus.finops.org/use-case/cost-by-service
  sql: |
    SELECT ServiceName, SUM(EffectiveCost) AS cost
    FROM focus_data
    WHERE BillingPeriodStart >= ? AND BillingPeriodEnd < ?
    GROUP BY ServiceName
commitment_usage:
  name: Commitment Usage
  focus_versions: ["1.1", "1.2"]
  sql: SELECT CommitmentDiscountId, SUM(CommitmentDiscountQuantity) FROM focus_data WHERE ChargePeriodStart >= ? GROUP BY 1
invoice_totals:
  name: Invoice Totals
  focus_versions: ["1.2"]
  sql: SELECT InvoiceId, SUM(BilledCost) FROM focus_data GROUP BY InvoiceId
broken_entry:
  name: Missing Body
  focus_versions: ["1.2"]
"#;

pub const OVERRIDES: &str = r#"
invoice_totals:
  name: Invoice Totals (corrected)
  reason: Upstream query grouped by the wrong column
  sql: SELECT InvoiceId, SUM(BilledCost) AS billed FROM focus_data GROUP BY InvoiceId
retired_query:
  name: Nothing to patch
"#;

pub struct Resources {
    dir: TempDir,
}

impl Resources {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    /// Columns, attributes, templates and overrides
    pub fn standard() -> Self {
        let resources = Self::empty();
        resources
            .write("specifications/columns.yaml", COLUMNS)
            .write("specifications/attributes.yaml", ATTRIBUTES)
            .write("queries/focus_queries.yaml", TEMPLATES)
            .write("queries/overrides.yaml", OVERRIDES);
        resources
    }

    pub fn write(&self, relative: &str, content: &str) -> &Self {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture dir");
        }
        fs::write(&path, content).expect("write fixture");
        self
    }

    pub fn remove(&self, relative: &str) -> &Self {
        fs::remove_file(self.dir.path().join(relative)).expect("remove fixture");
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self, version: &str) -> CatalogConfig {
        CatalogConfig::new(self.path()).with_version(version)
    }
}
