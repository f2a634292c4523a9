use crate::domain::snapshot::CartSnapshot;
use crate::domain::summary::OrderSummary;
use crate::error::Result;
use rust_decimal::Decimal;
use std::io::Write;

fn money(value: Decimal) -> String {
    format!("{value:.2}")
}

/// Writes a cart snapshot (and optionally its checkout summary) as CSV blocks.
pub struct SnapshotWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new().flexible(true).from_writer(sink);
        Self { writer }
    }

    /// Writes one row per line followed by a totals block.
    pub fn write_snapshot(&mut self, snapshot: &CartSnapshot) -> Result<()> {
        self.writer.write_record([
            "product",
            "name",
            "category",
            "quantity",
            "unit_price",
            "line_total",
        ])?;
        for line in snapshot.lines() {
            let quantity = line.quantity.to_string();
            let unit_price = line.unit_price.value().to_string();
            let line_total = money(line.line_total()?.rounded());
            self.writer.write_record([
                line.product_id.as_str(),
                line.product_name.as_str(),
                line.category.as_str(),
                quantity.as_str(),
                unit_price.as_str(),
                line_total.as_str(),
            ])?;
        }
        self.writer.write_record(["total_items", "total_amount"])?;
        self.writer.write_record([
            snapshot.total_items().to_string(),
            money(snapshot.total_amount()),
        ])?;
        self.writer.flush()?;
        Ok(())
    }

    /// Writes the checkout breakdown. `remaining_for_free_shipping` is left empty
    /// once the cart ships free.
    pub fn write_summary(&mut self, summary: &OrderSummary) -> Result<()> {
        self.writer.write_record([
            "subtotal",
            "tax",
            "shipping",
            "total",
            "remaining_for_free_shipping",
        ])?;
        self.writer.write_record([
            money(summary.subtotal),
            money(summary.tax),
            money(summary.shipping),
            money(summary.total),
            summary
                .remaining_for_free_shipping
                .map(money)
                .unwrap_or_default(),
        ])?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::line::{CartLine, Product, Quantity};
    use crate::domain::summary::PricingConfig;
    use rust_decimal_macros::dec;

    fn render(snapshot: &CartSnapshot, summary: Option<&OrderSummary>) -> String {
        let mut buffer = Vec::new();
        {
            let mut writer = SnapshotWriter::new(&mut buffer);
            writer.write_snapshot(snapshot).unwrap();
            if let Some(summary) = summary {
                writer.write_summary(summary).unwrap();
            }
        }
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_write_snapshot() {
        let product = Product::new("p1", "Rice", "Grains", dec!(19.995)).unwrap();
        let snapshot = CartSnapshot::from_lines(vec![CartLine::from_product(
            &product,
            Quantity::new(2).unwrap(),
        )])
        .unwrap();
        let output = render(&snapshot, None);
        assert!(output.contains("product,name,category,quantity,unit_price,line_total"));
        assert!(output.contains("p1,Rice,Grains,2,19.995,39.99"));
        assert!(output.contains("total_items,total_amount\n2,39.99"));
    }

    #[test]
    fn test_write_empty_snapshot_with_summary() {
        let snapshot = CartSnapshot::empty();
        let summary = OrderSummary::compute(&snapshot, &PricingConfig::default()).unwrap();
        let output = render(&snapshot, Some(&summary));
        assert!(output.contains("total_items,total_amount\n0,0.00"));
        assert!(output.contains(
            "subtotal,tax,shipping,total,remaining_for_free_shipping\n0.00,0.00,0.00,0.00,\n"
        ));
    }

    #[test]
    fn test_write_summary_with_remaining_for_free_shipping() {
        let product = Product::new("p1", "Rice", "Grains", dec!(120)).unwrap();
        let snapshot =
            CartSnapshot::from_lines(vec![CartLine::from_product(&product, Quantity::ONE)])
                .unwrap();
        let summary = OrderSummary::compute(&snapshot, &PricingConfig::default()).unwrap();
        let output = render(&snapshot, Some(&summary));
        assert!(output.contains("120.00,21.60,99.00,240.60,380.00"));
    }
}
