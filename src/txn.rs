//! Transaction seam and entry-function payload builders.
//!
//! Building, signing and submitting transactions is the job of an external
//! SDK; this crate only describes the calls it wants made. The
//! [`TransactionService`] trait is the whole contract: hand over an
//! [`EntryFunctionCall`], get back the confirmed transaction with its
//! emitted events.

use serde_json::{Value, json};

use crate::{
    address::AccountAddress, error::Result, market::OrderIntent, num::NormalizedOrderParams,
};

/// A call to a Move entry function: `package::module::function` plus
/// positional arguments. Integer arguments are encoded as decimal strings
/// and absent optionals as nulls, matching the node API's JSON conventions.
#[derive(Clone, Debug, PartialEq)]
pub struct EntryFunctionCall {
    pub function: String,
    pub type_args: Vec<String>,
    pub args: Vec<Value>,
}

/// One event emitted by a confirmed transaction.
#[derive(Clone, Debug)]
pub struct TransactionEvent {
    /// Fully qualified event type, e.g.
    /// `0x…::dex_accounts::SubaccountCreatedEvent`.
    pub event_type: String,
    pub data: Value,
}

/// A transaction that reached the chain.
#[derive(Clone, Debug)]
pub struct ConfirmedTransaction {
    pub hash: String,
    pub success: bool,
    pub events: Vec<TransactionEvent>,
}

/// Submits state-changing operations and waits for confirmation.
///
/// Implementations wrap whatever signing SDK the integrator uses. Errors
/// from this trait are fatal to the current flow; retrying a submission is
/// the caller's decision, never this crate's.
pub trait TransactionService {
    fn submit_entry_function(
        &self,
        call: EntryFunctionCall,
    ) -> impl Future<Output = Result<ConfirmedTransaction>>;
}

fn u64_arg(value: u64) -> Value {
    Value::String(value.to_string())
}

/// `dex_accounts::create_new_subaccount`. No arguments.
pub fn create_subaccount_call(package: AccountAddress) -> EntryFunctionCall {
    EntryFunctionCall {
        function: format!("{package}::dex_accounts::create_new_subaccount"),
        type_args: vec![],
        args: vec![],
    }
}

/// `usdc::mint`: testnet collateral mint, amount in chain units.
pub fn mint_collateral_call(package: AccountAddress, chain_amount: u64) -> EntryFunctionCall {
    EntryFunctionCall {
        function: format!("{package}::usdc::mint"),
        type_args: vec![],
        args: vec![u64_arg(chain_amount)],
    }
}

/// `dex_accounts::deposit_to_subaccount_at`: moves collateral from the
/// owner account into a subaccount. The asset is identified by its derived
/// metadata address, not by a type argument.
pub fn deposit_collateral_call(
    package: AccountAddress,
    subaccount: AccountAddress,
    asset_metadata: AccountAddress,
    chain_amount: u64,
) -> EntryFunctionCall {
    EntryFunctionCall {
        function: format!("{package}::dex_accounts::deposit_to_subaccount_at"),
        type_args: vec![],
        args: vec![
            json!(subaccount.to_string()),
            json!(asset_metadata.to_string()),
            u64_arg(chain_amount),
        ],
    }
}

/// `dex_accounts::place_order_to_subaccount` with the venue's full argument
/// list. Trigger prices, builder fields and the like are not used by this
/// crate and are passed as nulls.
pub fn place_order_call(
    package: AccountAddress,
    subaccount: AccountAddress,
    market_addr: &str,
    params: &NormalizedOrderParams,
    intent: &OrderIntent,
    client_order_id: &str,
) -> EntryFunctionCall {
    EntryFunctionCall {
        function: format!("{package}::dex_accounts::place_order_to_subaccount"),
        type_args: vec![],
        args: vec![
            json!(subaccount.to_string()),
            json!(market_addr),
            u64_arg(params.chain_price),
            u64_arg(params.chain_size),
            json!(intent.is_buy),
            json!(intent.time_in_force.as_u8()),
            json!(intent.reduce_only),
            json!(client_order_id),
            Value::Null, // stop_price
            Value::Null, // tp_trigger_price
            Value::Null, // tp_limit_price
            Value::Null, // sl_trigger_price
            Value::Null, // sl_limit_price
            Value::Null, // builder_addr
            Value::Null, // builder_fee
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::TimeInForce;

    fn package() -> AccountAddress {
        "0xb8a5788314451ce4d2fbbad32e1bad88d4184b73943b7fe5166eab93cf1a5a95"
            .parse()
            .unwrap()
    }

    #[test]
    fn test_create_subaccount_call_shape() {
        let call = create_subaccount_call(package());
        assert_eq!(
            call.function,
            format!("{}::dex_accounts::create_new_subaccount", package())
        );
        assert!(call.type_args.is_empty());
        assert!(call.args.is_empty());
    }

    #[test]
    fn test_integer_args_are_strings() {
        let call = mint_collateral_call(package(), 250_000_000);
        assert_eq!(call.args, vec![json!("250000000")]);
    }

    #[test]
    fn test_place_order_call_argument_layout() {
        let params = NormalizedOrderParams {
            human_price: 50000.0,
            human_size: 0.001,
            chain_price: 50_000_000_000_000,
            chain_size: 1_000_000,
        };
        let intent = OrderIntent {
            price: 50000.0,
            size: 0.001,
            is_buy: true,
            time_in_force: TimeInForce::GoodTilCancelled,
            reduce_only: false,
            client_order_id: None,
        };
        let subaccount: AccountAddress = "0x42".parse().unwrap();

        let call = place_order_call(
            package(),
            subaccount,
            "0x7777",
            &params,
            &intent,
            "order-1700000000000",
        );

        assert_eq!(call.args.len(), 15);
        assert_eq!(call.args[0], json!(subaccount.to_string()));
        assert_eq!(call.args[1], json!("0x7777"));
        assert_eq!(call.args[2], json!("50000000000000"));
        assert_eq!(call.args[3], json!("1000000"));
        assert_eq!(call.args[4], json!(true));
        assert_eq!(call.args[5], json!(0));
        assert_eq!(call.args[6], json!(false));
        assert_eq!(call.args[7], json!("order-1700000000000"));
        assert!(call.args[8..].iter().all(Value::is_null));
    }
}
