use chrono::NaiveDate;

use crate::error::{AppError, AppResult};
use crate::model::ProductStock;

/// Fixed column order and labels of the inventory export.
pub const CSV_HEADER: [&str; 8] = [
    "Codice",
    "Prodotto",
    "Marca",
    "Fornitore",
    "Giacenza Totale",
    "Unita",
    "Prezzo Unitario",
    "Valore Totale",
];

/// Renders the whole inventory as UTF-8 CSV in memory, one row per product.
/// Rows are byte-identical across calls as long as the store is unchanged.
pub fn inventory_csv(rows: &[ProductStock]) -> AppResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for stock in rows {
        let p = &stock.product;
        writer.write_record(&[
            p.barcode.clone(),
            p.name.clone(),
            p.brand.clone(),
            p.supplier.clone(),
            stock.total_quantity.to_string(),
            p.unit_measure.clone(),
            p.unit_price.to_string(),
            stock.total_value().to_string(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Csv(csv::Error::from(e.into_error())))
}

/// Attachment name for the export, date-stamped like `inventario_20250301.csv`.
pub fn export_filename(date: NaiveDate) -> String {
    format!("inventario_{}.csv", date.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Product;

    fn stock(barcode: &str, name: &str, price: f64, total: f64) -> ProductStock {
        ProductStock {
            product: Product {
                id: 1,
                barcode: barcode.to_string(),
                name: name.to_string(),
                brand: "Molino".to_string(),
                supplier: "Rossi".to_string(),
                unit_measure: "Kg".to_string(),
                unit_price: price,
            },
            total_quantity: total,
        }
    }

    #[test]
    fn header_and_value_column() {
        let rows = vec![stock("111", "Farina", 1.5, 4.0)];
        let bytes = inventory_csv(&rows).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Codice,Prodotto,Marca,Fornitore,Giacenza Totale,Unita,Prezzo Unitario,Valore Totale"
        );
        assert_eq!(lines.next().unwrap(), "111,Farina,Molino,Rossi,4,Kg,1.5,6");
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn export_is_idempotent() {
        let rows = vec![
            stock("111", "Farina", 1.5, 4.0),
            stock("222", "Lievito", 0.8, 0.0),
        ];
        let first = inventory_csv(&rows).unwrap();
        let second = inventory_csv(&rows).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let rows = vec![stock("333", "Sale, grosso", 0.5, 1.0)];
        let text = String::from_utf8(inventory_csv(&rows).unwrap()).unwrap();
        assert!(text.contains("\"Sale, grosso\""));
    }

    #[test]
    fn filename_is_date_stamped() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(export_filename(d), "inventario_20250301.csv");
    }
}
