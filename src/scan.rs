/// Check-in vs check-out mode of the scan page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    In,
    Out,
}

impl ScanMode {
    pub fn parse(s: &str) -> Option<ScanMode> {
        match s {
            "in" => Some(ScanMode::In),
            "out" => Some(ScanMode::Out),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::In => "in",
            ScanMode::Out => "out",
        }
    }
}

/// Where a scanned barcode sends the user. Pure routing, no persisted state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Known product: go to its detail page to add or consume a batch.
    ProductDetail(i64),
    /// Unknown barcode in check-in mode: create the product, form pre-filled
    /// with the scanned code.
    CreateProduct(String),
    /// Unknown barcode in check-out mode: nothing to withdraw from, back to
    /// the dashboard with a notice.
    UnknownProduct,
    /// Unrecognized mode string falls through to the dashboard.
    Dashboard,
}

pub fn dispatch(mode: Option<ScanMode>, code: &str, product_id: Option<i64>) -> ScanOutcome {
    match (mode, product_id) {
        (Some(ScanMode::In), Some(id)) => ScanOutcome::ProductDetail(id),
        (Some(ScanMode::In), None) => ScanOutcome::CreateProduct(code.to_string()),
        (Some(ScanMode::Out), Some(id)) => ScanOutcome::ProductDetail(id),
        (Some(ScanMode::Out), None) => ScanOutcome::UnknownProduct,
        (None, _) => ScanOutcome::Dashboard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_in_known_product_goes_to_detail() {
        assert_eq!(
            dispatch(Some(ScanMode::In), "111", Some(7)),
            ScanOutcome::ProductDetail(7)
        );
    }

    #[test]
    fn check_in_unknown_product_prefills_creation() {
        assert_eq!(
            dispatch(Some(ScanMode::In), "222", None),
            ScanOutcome::CreateProduct("222".to_string())
        );
    }

    #[test]
    fn check_out_known_product_goes_to_detail() {
        assert_eq!(
            dispatch(Some(ScanMode::Out), "111", Some(7)),
            ScanOutcome::ProductDetail(7)
        );
    }

    #[test]
    fn check_out_unknown_product_reports_not_found() {
        assert_eq!(
            dispatch(Some(ScanMode::Out), "222", None),
            ScanOutcome::UnknownProduct
        );
    }

    #[test]
    fn unknown_mode_falls_back_to_dashboard() {
        assert_eq!(ScanMode::parse("sideways"), None);
        assert_eq!(dispatch(None, "111", Some(7)), ScanOutcome::Dashboard);
    }
}
