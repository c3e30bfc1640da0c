//! Receipt

use std::io;

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    checkout::{CheckoutSummary, compute_checkout_summary},
    payments::Allocations,
    pricing::TotalPriceError,
};

/// Errors that can occur when building a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error calculating a line or the checkout totals.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Printable view of a checkout: the cart lines, the payment split and the
/// totals derived from them.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    cart: &'a Cart,
    allocations: &'a Allocations,
    summary: CheckoutSummary,
}

impl<'a> Receipt<'a> {
    /// Build a receipt for a cart and its payment split.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the totals cannot be calculated.
    pub fn from_checkout(
        cart: &'a Cart,
        allocations: &'a Allocations,
    ) -> Result<Self, ReceiptError> {
        Ok(Self {
            cart,
            allocations,
            summary: compute_checkout_summary(cart, allocations)?,
        })
    }

    /// Totals shown at the foot of the receipt.
    #[must_use]
    pub fn summary(&self) -> &CheckoutSummary {
        &self.summary
    }

    /// Prints the receipt to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if a line total overflows or the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut items = Builder::default();

        items.push_record(["", "Item", "Qty", "Unit Price", "Line Total"]);

        for (idx, line) in self.cart.lines().iter().enumerate() {
            let product = line.product();

            items.push_record([
                format!("#{}", idx + 1),
                product.name.clone(),
                line.quantity().to_string(),
                product.selling_price.to_string(),
                line.line_total()?.to_string(),
            ]);
        }

        write_table(&mut out, items, 2..5)?;

        let mut payments = Builder::default();

        payments.push_record(["", "Payment Method", "Amount"]);

        for (idx, entry) in self.allocations.iter().enumerate() {
            payments.push_record([
                format!("#{}", idx + 1),
                entry.method().name.clone(),
                entry.amount().to_string(),
            ]);
        }

        write_table(&mut out, payments, 2..3)?;

        write_summary(&mut out, &self.summary)
    }
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    numeric: std::ops::Range<usize>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(numeric), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)
}

fn write_summary(out: &mut impl io::Write, summary: &CheckoutSummary) -> Result<(), ReceiptError> {
    let mut lines: Vec<(&str, Money<'static, Currency>)> = vec![
        ("Total:", *summary.total()),
        ("Paid:", *summary.paid()),
    ];

    match summary.change_due() {
        Some(change) => lines.push(("Change:", change)),
        None => lines.push(("Remaining:", *summary.remaining())),
    }

    let label_width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let values: Vec<String> = lines.iter().map(|(_, value)| value.to_string()).collect();
    let value_width = values.iter().map(String::len).max().unwrap_or(0);

    for ((label, _), value) in lines.iter().zip(&values) {
        writeln!(out, " {label:>label_width$}  {value:>value_width$}")
            .map_err(|_err| ReceiptError::IO)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}
