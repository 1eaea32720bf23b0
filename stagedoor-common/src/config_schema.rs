use schemars::schema_for;
use stagedoor_common::StagedoorConfigStore;

#[allow(clippy::unwrap_used)]
pub fn main() {
    let schema = schema_for!(StagedoorConfigStore);
    println!("{}", serde_json::to_string_pretty(&schema).unwrap());
}
