use crate::error::CliError;
use model::{
    core::value::Value,
    pagination::cursor::Cursor,
};
use serde::Serialize;

#[derive(Serialize)]
struct PlanReport<'a> {
    dialect: String,
    sql: &'a str,
    params: Vec<String>,
    page_size: usize,
    backwards: bool,
    first_page: bool,
}

#[derive(Serialize)]
struct CursorReport<'a> {
    primary_id: &'a str,
    order_value: String,
    order_kind: &'static str,
    backwards: bool,
    contract: String,
    contract_ok: Option<bool>,
}

pub struct PlanOutput<'a> {
    pub dialect: String,
    pub sql: &'a str,
    pub params: &'a [Value],
    pub page_size: usize,
    pub backwards: bool,
    pub first_page: bool,
}

pub fn print_plan(plan: PlanOutput, json: bool) -> Result<(), CliError> {
    if json {
        let report = PlanReport {
            dialect: plan.dialect,
            sql: plan.sql,
            params: plan.params.iter().map(ToString::to_string).collect(),
            page_size: plan.page_size,
            backwards: plan.backwards,
            first_page: plan.first_page,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("-- {} (page size {})", plan.dialect, plan.page_size);
    println!("{};", plan.sql);
    for (i, param) in plan.params.iter().enumerate() {
        println!("-- ${} = {param}", i + 1);
    }
    Ok(())
}

pub fn print_cursor(cursor: &Cursor, contract_ok: Option<bool>, json: bool) -> Result<(), CliError> {
    let order_value = Value::from(cursor.order_value().clone());
    if json {
        let report = CursorReport {
            primary_id: cursor.primary_id(),
            order_value: order_value.to_string(),
            order_kind: order_value.kind(),
            backwards: cursor.is_backwards(),
            contract: format!("{:016x}", cursor.contract()),
            contract_ok,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("primary id:  {}", cursor.primary_id());
    println!("order value: {order_value} ({})", order_value.kind());
    println!(
        "direction:   {}",
        if cursor.is_backwards() { "backwards" } else { "forwards" }
    );
    println!("contract:    {:016x}", cursor.contract());
    if let Some(ok) = contract_ok {
        println!("matches:     {ok}");
    }
    Ok(())
}
