use crate::domain::line::{Product, ProductId};
use crate::error::{CartError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Add,
    Update,
    Remove,
    Clear,
    Login,
    Logout,
    Load,
    Order,
}

/// One raw row of a command script.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CommandRecord {
    pub command: CommandKind,
    pub product: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub identity: Option<String>,
}

/// A validated cart command ready to be applied to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum CartCommand {
    Add { product: Product, quantity: i64 },
    Update { product_id: ProductId, quantity: i64 },
    Remove { product_id: ProductId },
    Clear,
    Login { identity: String },
    Logout,
    Load,
    Order,
}

fn required<T>(value: Option<T>, field: &str, command: CommandKind) -> Result<T> {
    value.ok_or_else(|| {
        CartError::Validation(format!("'{field}' is required for {command:?} commands"))
    })
}

impl TryFrom<CommandRecord> for CartCommand {
    type Error = CartError;

    fn try_from(record: CommandRecord) -> Result<Self> {
        let kind = record.command;
        Ok(match kind {
            CommandKind::Add => {
                let id = required(record.product, "product", kind)?;
                let name = record.name.unwrap_or_else(|| id.clone());
                let product = Product::new(
                    id,
                    name,
                    record.category.unwrap_or_default(),
                    required(record.price, "price", kind)?,
                )?;
                CartCommand::Add {
                    product,
                    quantity: record.quantity.unwrap_or(1),
                }
            }
            CommandKind::Update => CartCommand::Update {
                product_id: required(record.product, "product", kind)?.into(),
                quantity: required(record.quantity, "quantity", kind)?,
            },
            CommandKind::Remove => CartCommand::Remove {
                product_id: required(record.product, "product", kind)?.into(),
            },
            CommandKind::Clear => CartCommand::Clear,
            CommandKind::Login => CartCommand::Login {
                identity: required(record.identity, "identity", kind)?,
            },
            CommandKind::Logout => CartCommand::Logout,
            CommandKind::Load => CartCommand::Load,
            CommandKind::Order => CartCommand::Order,
        })
    }
}

/// Reads cart commands from a CSV source.
///
/// Columns: `command, product, name, category, price, quantity, identity`.
/// Whitespace is trimmed and short rows are accepted, so `clear` or `logout`
/// rows may omit the trailing columns.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and validates commands; a bad row yields an `Err` and the
    /// iterator carries on with the next one.
    pub fn commands(self) -> impl Iterator<Item = Result<CartCommand>> {
        self.reader.into_deserialize().map(|result| {
            let record: CommandRecord = result?;
            CartCommand::try_from(record)
        })
    }
}
