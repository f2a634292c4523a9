use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("cartkeeper"));
    cmd.arg("tests/fixtures/commands.csv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "product,name,category,quantity,unit_price,line_total",
        ))
        // Guest lines were merged into the remote cart on login
        .stdout(predicate::str::contains("p1,Basmati Rice,Grains,3,120.50,361.50"))
        .stdout(predicate::str::contains("p3,Ghee,Dairy,1,549.00,549.00"))
        .stdout(predicate::str::contains("p2,").not())
        .stdout(predicate::str::contains("total_items,total_amount\n4,910.50"));

    Ok(())
}

#[test]
fn test_cli_summary() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("cartkeeper"));
    cmd.arg("tests/fixtures/commands.csv").arg("--summary");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "subtotal,tax,shipping,total,remaining_for_free_shipping\n910.50,163.89,0.00,1074.39,\n",
        ));

    Ok(())
}

#[test]
fn test_cli_custom_pricing() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!("cartkeeper"));
    cmd.arg("tests/fixtures/commands.csv")
        .arg("--summary")
        .arg("--tax-rate")
        .arg("0")
        .arg("--free-shipping-threshold")
        .arg("1000")
        .arg("--shipping-fee")
        .arg("40");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("910.50,0.00,40.00,950.50,89.50"));

    Ok(())
}

#[test]
fn test_cli_rejects_invalid_tax_rate() {
    let mut cmd = Command::new(cargo_bin!("cartkeeper"));
    cmd.arg("tests/fixtures/commands.csv")
        .arg("--tax-rate")
        .arg("1.5");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Tax rate must be between 0 and 1"));
}
