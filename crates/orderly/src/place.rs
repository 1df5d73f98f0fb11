// SPDX-FileCopyrightText: 2026 Orderly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `orderly place` command implementation.
//!
//! Prompts for whatever the flags left out, then hands the raw input to
//! [`OrderService`]. Nothing is reported as saving until the input has
//! validated. Ctrl-C during the save cancels it cleanly.

use std::sync::Arc;

use async_trait::async_trait;
use clap::Args;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use orderly_config::OrderlyConfig;
use orderly_core::{Order, OrderError, OrderId, OrderRepository};
use orderly_service::{InMemoryCatalog, OrderService};
use orderly_storage::{SqliteOrderRepository, prepare_store};

/// Order fields; any left out are asked for interactively.
#[derive(Args, Debug, Default)]
pub struct PlaceArgs {
    /// Customer name.
    #[arg(long)]
    pub customer: Option<String>,
    /// Product name, as listed by `orderly products`.
    #[arg(long)]
    pub product: Option<String>,
    /// Number of units. Kept as text so validation messages match the prompt.
    #[arg(long)]
    pub quantity: Option<String>,
}

impl PlaceArgs {
    fn is_complete(&self) -> bool {
        self.customer.is_some() && self.product.is_some() && self.quantity.is_some()
    }
}

/// Saves through the repository, abandoning the save when `token` fires.
struct CancellableRepository {
    inner: SqliteOrderRepository,
    token: CancellationToken,
}

#[async_trait]
impl OrderRepository for CancellableRepository {
    async fn save(&self, order: &Order) -> Result<OrderId, OrderError> {
        self.inner.save_with_cancel(order, &self.token).await
    }
}

/// Runs the `orderly place` command.
pub async fn run_place(config: &OrderlyConfig, args: PlaceArgs) -> Result<(), OrderError> {
    prepare_store(&config.storage).await?;
    let repository = SqliteOrderRepository::from_config(&config.storage, &config.retry)?;

    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling save");
            interrupt.cancel();
        }
    });

    let service = OrderService::new(
        Arc::new(InMemoryCatalog::default()),
        Arc::new(CancellableRepository {
            inner: repository,
            token,
        }),
    );

    let Some(input) = collect_input(args)? else {
        return Err(OrderError::Cancelled);
    };

    let order = service
        .prepare_order(&input.customer, &input.product, &input.quantity)
        .await?;
    println!("{}", "Order complete!".green().bold());
    println!("{order}");

    println!("Saving order to database...");
    let receipt = service.save_order(order).await?;
    println!("Saved as order {}", receipt.id);
    println!("{}", "Done.".green());
    Ok(())
}

struct Input {
    customer: String,
    product: String,
    quantity: String,
}

/// Fills in missing fields from the terminal. `None` if the user quit.
fn collect_input(args: PlaceArgs) -> Result<Option<Input>, OrderError> {
    if args.is_complete() {
        debug!("all order fields given, skipping prompts");
        return Ok(Some(Input {
            customer: args.customer.unwrap_or_default(),
            product: args.product.unwrap_or_default(),
            quantity: args.quantity.unwrap_or_default(),
        }));
    }

    let mut rl = DefaultEditor::new()
        .map_err(|e| OrderError::Configuration(format!("failed to initialize readline: {e}")))?;

    println!("{}", "Welcome to Order Processor!".bold());
    let fields = [
        (args.customer, "Enter customer name: "),
        (args.product, "Enter product name: "),
        (args.quantity, "Enter quantity: "),
    ];
    let mut answers = Vec::with_capacity(fields.len());
    for (given, prompt) in fields {
        let answer = match given {
            Some(value) => value,
            None => match rl.readline(prompt) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(None),
                Err(e) => {
                    return Err(OrderError::Validation(format!("could not read input: {e}")));
                }
            },
        };
        answers.push(answer);
    }

    let mut answers = answers.into_iter();
    Ok(Some(Input {
        customer: answers.next().unwrap_or_default(),
        product: answers.next().unwrap_or_default(),
        quantity: answers.next().unwrap_or_default(),
    }))
}
