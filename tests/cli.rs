use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn oregano(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("oregano").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("NO_COLOR", "1")
        .env_remove("OREGANO_DATA_DIR")
        .env_remove("OREGANO_LOG")
        .arg("--data-dir")
        .arg(home.path().join("data"));
    cmd
}

#[test]
fn script_mode_records_and_lists_transactions() {
    let home = TempDir::new().unwrap();
    oregano(&home)
        .write_stdin(
            "account chase -t checking\n\
             new chase Kroger 12.50 -d 2024-01-02 -c groceries\n\
             # comments are skipped\n\
             trsn chase\n\
             quit\n",
        )
        .assert()
        .success()
        .stdout(contains("Created checking account chase"))
        .stdout(contains("Kroger"))
        .stdout(contains("-$12.50"));
}

#[test]
fn new_shows_amount_with_account_sign() {
    let home = TempDir::new().unwrap();
    oregano(&home)
        .write_stdin(
            "account chase -t checking\n\
             account visa -t credit_card\n\
             new chase Kroger 12.50\n\
             new visa Shell 30\n",
        )
        .assert()
        .success()
        .stdout(contains("Added transaction [2]: Kroger -$12.50"))
        .stdout(contains("Added transaction [3]: Shell $30.00"));
}

#[test]
fn non_finite_amounts_are_parse_errors() {
    let home = TempDir::new().unwrap();
    oregano(&home)
        .write_stdin("account chase\nnew chase Pay inf\nanchor chase NaN 2024-01-01\nbalance chase\n")
        .assert()
        .success()
        .stderr(contains("Could not parse amount from 'inf'"))
        .stderr(contains("Could not parse amount from 'NaN'"))
        .stdout(contains("chase: $0.00"));
}

#[test]
fn script_mode_sums_by_category() {
    let home = TempDir::new().unwrap();
    oregano(&home)
        .write_stdin(
            "account chase\n\
             new chase Kroger 20 -c groceries\n\
             new chase Aldi 5 -c groceries\n\
             new chase Shell 40 -c gas\n\
             sums\n",
        )
        .assert()
        .success()
        .stdout(contains("groceries"))
        .stdout(contains("$25.00"))
        .stdout(contains("$40.00"));
}

#[test]
fn errors_do_not_stop_the_script() {
    let home = TempDir::new().unwrap();
    oregano(&home)
        .write_stdin("ls --bogus\nfrobnicate\naccount 9lives\naccount ok\nls\n")
        .assert()
        .success()
        .stderr(contains("Unrecognized flag"))
        .stderr(contains("Usage: ls"))
        .stderr(contains("frobnicate"))
        .stdout(contains("ok"));
}

#[test]
fn data_persists_between_runs() {
    let home = TempDir::new().unwrap();
    oregano(&home)
        .write_stdin("account savings -t savings --anchor 100 2024-01-01\n")
        .assert()
        .success();
    oregano(&home)
        .write_stdin("balance savings\n")
        .assert()
        .success()
        .stdout(contains("savings: $100.00"));
}

#[test]
fn script_import_with_column_map() {
    let home = TempDir::new().unwrap();
    let csv = home.path().join("stmt.csv");
    std::fs::write(&csv, "Date,Payee,Amount,Account\n2024-03-01,Kroger,10.00,chase\n").unwrap();
    let script = format!(
        "account chase\nimport {} -H -m date=0,payee=1,amount=2,account=3\nimport {} -H -m date=0,payee=1,amount=2,account=3\n",
        csv.display(),
        csv.display()
    );
    oregano(&home)
        .write_stdin(script)
        .assert()
        .success()
        .stdout(contains("Imported 1 transaction(s)"))
        .stdout(contains("already been imported"));
}

#[test]
fn init_then_status() {
    let home = TempDir::new().unwrap();
    oregano(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Initialized database"));
    oregano(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(contains("already initialized"));
    oregano(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(contains("Accounts:      0"));
}

#[test]
fn status_without_database() {
    let home = TempDir::new().unwrap();
    oregano(&home)
        .arg("status")
        .assert()
        .success()
        .stdout(contains("Database not found"));
}

#[test]
fn backup_to_explicit_path() {
    let home = TempDir::new().unwrap();
    oregano(&home).write_stdin("account chase\n").assert().success();
    let out = home.path().join("copy.db");
    oregano(&home)
        .arg("backup")
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    assert!(out.exists());
}

#[test]
fn backup_fails_without_database() {
    let home = TempDir::new().unwrap();
    oregano(&home)
        .arg("backup")
        .assert()
        .failure()
        .stderr(contains("Error:"));
}
