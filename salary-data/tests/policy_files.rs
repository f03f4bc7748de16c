//! Integration tests that load policy files from the on-disk fixtures.

use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use salary_core::{PolicyError, PolicyRegistryError, SalaryConverter, TaxBracket};
use salary_data::{PolicyFileError, PolicyLoader};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn load_dir_registers_every_toml_file() {
    let registry = PolicyLoader::load_dir(&fixture("policies")).expect("fixture policies load");

    // README.txt is ignored.
    assert_eq!(registry.available_years(), vec![2024, 2025]);
    assert_eq!(registry.latest().unwrap().tax_year(), 2025);
}

#[test]
fn annual_fixture_is_stored_monthly() {
    let registry = PolicyLoader::load_dir(&fixture("policies")).unwrap();
    let policy = registry.get(2024).unwrap();

    assert_eq!(policy.reference_wage(), dec!(2200));
    assert_eq!(
        policy.brackets(),
        &[
            TaxBracket::bounded(dec!(6600), dec!(0.19)),
            TaxBracket::unbounded(dec!(0.30)),
        ]
    );
    assert_eq!(policy.contribution_cap(), dec!(8800));
}

#[test]
fn annual_fixture_converts_monthly_salary() {
    let registry = PolicyLoader::load_dir(&fixture("policies")).unwrap();
    let policy = registry.get(2024).unwrap();
    let converter = SalaryConverter::new(policy);

    let result = converter.compute_net(dec!(3000), None, false).unwrap();

    // relief 4800 / 12 = 400; tax (3000 - 400) × 19%; contributions 3000 × 19%
    assert_eq!(result.relief_applied, dec!(400));
    assert_eq!(result.income_tax, dec!(494.00));
    assert_eq!(result.employee_contributions.total(), dec!(570.00));
    assert_eq!(result.net, dec!(1936.00));
}

#[test]
fn shipped_policy_matches_fixture() {
    let shipped = PolicyLoader::reference().unwrap();
    let fixture = PolicyLoader::from_file(&fixture("policies/policy_2025.toml")).unwrap();

    assert_eq!(shipped, fixture);
}

#[test]
fn unknown_year_lists_available_years() {
    let registry = PolicyLoader::load_dir(&fixture("policies")).unwrap();

    assert_eq!(
        registry.get(2030).unwrap_err(),
        PolicyRegistryError::UnknownYear {
            requested: 2030,
            available: vec![2024, 2025],
        }
    );
}

#[test]
fn duplicate_tax_year_names_both_files() {
    let error = PolicyLoader::load_dir(&fixture("duplicate_years")).unwrap_err();

    match error {
        PolicyFileError::DuplicateTaxYear {
            tax_year,
            first,
            second,
        } => {
            assert_eq!(tax_year, 2025);
            assert!(first.ends_with("a.toml"));
            assert!(second.ends_with("b.toml"));
        }
        other => panic!("expected DuplicateTaxYear, got {other:?}"),
    }
}

#[test]
fn invalid_file_reports_path_and_reason() {
    let error = PolicyLoader::load_dir(&fixture("invalid")).unwrap_err();

    let PolicyFileError::InFile { path, source } = error else {
        panic!("expected InFile, got {error:?}");
    };
    assert!(path.ends_with("policy_2025.toml"));
    assert!(matches!(
        *source,
        PolicyFileError::Invalid {
            tax_year: 2025,
            source: PolicyError::UnknownDefaultReliefCategory(ref name),
        } if name == "missing"
    ));
}

#[test]
fn directory_without_policies_is_an_error() {
    let dir = std::env::temp_dir().join(format!("salary-data-empty-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let result = PolicyLoader::load_dir(&dir);

    std::fs::remove_dir_all(&dir).unwrap();
    assert!(matches!(result, Err(PolicyFileError::EmptyDirectory(_))));
}
