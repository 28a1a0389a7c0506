use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use liqpay_gateway::domain::envelope::sign;
use predicates::prelude::*;
use serde_json::json;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn config_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "public_key = \"pk\"").unwrap();
    writeln!(file, "private_key = \"sk\"").unwrap();
    writeln!(file, "server_url = \"https://shop.test/payments/liqpay\"").unwrap();
    file
}

fn signed_row(payload: serde_json::Value, key: &str) -> String {
    let data = BASE64.encode(payload.to_string());
    let signature = sign(key, &data);
    format!("{data},{signature}")
}

fn liqpay(config: &NamedTempFile) -> Command {
    let mut cmd = Command::new(cargo_bin!("liqpay"));
    cmd.env_remove("LIQPAY_PRIVATE_KEY")
        .env_remove("LIQPAY_PUBLIC_KEY")
        .env_remove("LIQPAY_SANDBOX")
        .env_remove("LIQPAY_API_URL")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config.path());
    cmd
}

#[test]
fn test_sign_known_vector() {
    let config = config_file();
    let mut fields = NamedTempFile::new().unwrap();
    write!(
        fields,
        r#"{{"version":3,"public_key":"pk","action":"pay","amount":"10.00","currency":"UAH","order_id":"tx-1"}}"#
    )
    .unwrap();

    liqpay(&config)
        .arg("sign")
        .arg(fields.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("jQjFXmHddvT0CXdWXzBziWqOYmg="));
}

#[test]
fn test_checkout_prints_action() {
    let config = config_file();
    let mut order = NamedTempFile::new().unwrap();
    write!(
        order,
        r#"{{"order_id": "77", "amount": "12.50", "description": "Socks",
            "return_url": "https://shop.test/thanks"}}"#
    )
    .unwrap();

    liqpay(&config)
        .arg("checkout")
        .arg(order.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://www.liqpay.ua/api/3/checkout",
        ))
        .stdout(predicate::str::contains("\"method\": \"POST\""));
}

#[test]
fn test_checkout_rejects_weekly_subscription() {
    let config = config_file();
    let mut order = NamedTempFile::new().unwrap();
    write!(
        order,
        r#"{{"order_id": "78", "amount": "1", "subscription":
            {{"start": "2026-01-01T00:00:00Z", "periodicity": "week"}}}}"#
    )
    .unwrap();

    liqpay(&config)
        .arg("checkout")
        .arg(order.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("month and year periodicity"));
}

#[test]
fn test_callback_prints_invoice() {
    let config = config_file();
    let row = signed_row(
        json!({"version": 3, "public_key": "pk", "action": "pay", "status": "success",
               "payment_id": 5, "order_id": "tx-5", "amount": 15.0}),
        "sk",
    );
    let (data, signature) = row.split_once(',').unwrap();
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("data", data)
        .append_pair("signature", signature)
        .finish();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{body}").unwrap();

    liqpay(&config)
        .arg("callback")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\":\"payment\""))
        .stdout(predicate::str::contains("\"status\":\"successful\""));
}

#[test]
fn test_replay_skips_bad_rows() {
    let config = config_file();
    let mut csv = NamedTempFile::new().unwrap();
    writeln!(csv, "data,signature").unwrap();
    writeln!(
        csv,
        "{}",
        signed_row(
            json!({"version": 3, "public_key": "pk", "action": "pay", "status": "success",
                   "payment_id": 1, "order_id": "tx-1", "amount": 10.0,
                   "receiver_commission": 0.28}),
            "sk"
        )
    )
    .unwrap();
    // forged
    writeln!(
        csv,
        "{}",
        signed_row(
            json!({"version": 3, "public_key": "pk", "action": "pay", "status": "success",
                   "payment_id": 2, "order_id": "tx-2", "amount": 999.0}),
            "wrong"
        )
    )
    .unwrap();
    // duplicate delivery of the first row
    writeln!(
        csv,
        "{}",
        signed_row(
            json!({"version": 3, "public_key": "pk", "action": "pay", "status": "success",
                   "payment_id": 1, "order_id": "tx-1", "amount": 10.0,
                   "receiver_commission": 0.28}),
            "sk"
        )
    )
    .unwrap();
    writeln!(
        csv,
        "{}",
        signed_row(
            json!({"version": 3, "public_key": "pk", "action": "pay", "status": "reversed",
                   "payment_id": 1, "order_id": "tx-1", "amount": 10.0,
                   "refund_amount": 10.0, "receiver_commission": 0.28}),
            "sk"
        )
    )
    .unwrap();

    liqpay(&config)
        .arg("replay")
        .arg(csv.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("callback rejected"))
        .stdout(predicate::str::contains(
            "provider,payment_id,order_id,type,status,amount,fee",
        ))
        .stdout(predicate::str::contains("liqpay,1,tx-1,payment,successful,10,0.28"))
        .stdout(predicate::str::contains("liqpay,1,tx-1,refund,refund,10,0"))
        .stdout(predicate::str::contains("tx-2").not());
}

#[test]
fn test_missing_keys_fail_fast() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "public_key = \"pk\"").unwrap();
    writeln!(config, "private_key = \"\"").unwrap();
    writeln!(config, "server_url = \"https://shop.test/cb\"").unwrap();
    let mut fields = NamedTempFile::new().unwrap();
    write!(fields, "{{}}").unwrap();

    liqpay(&config)
        .arg("sign")
        .arg(fields.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("private_key"));
}
