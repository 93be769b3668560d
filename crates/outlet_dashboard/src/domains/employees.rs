//! Employee listing helpers: local search and contract tracking.

use chrono::NaiveDate;
use outlet_dashboard_client::Employee;
use outlet_dashboard_client::utils::parse_report_date;

/// Case-insensitive match of `term` against name, NIK, position and outlet.
pub fn matches_search(employee: &Employee, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    [
        Some(employee.name.as_str()),
        Some(employee.nik.as_str()),
        employee.position.as_deref(),
        employee.outlet_name.as_deref(),
        employee.email.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&term))
}

pub fn search<'a>(
    employees: &'a [Employee],
    term: &str,
    status: Option<&str>,
) -> Vec<&'a Employee> {
    employees
        .iter()
        .filter(|e| matches_search(e, term))
        .filter(|e| match status {
            Some(wanted) => e
                .status
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(wanted)),
            None => true,
        })
        .collect()
}

/// Employees whose contract ends within `within_days` of `today` (inclusive),
/// soonest first. Already expired contracts are included.
pub fn contracts_ending<'a>(
    employees: &'a [Employee],
    today: NaiveDate,
    within_days: i64,
) -> Vec<(&'a Employee, NaiveDate)> {
    let mut out: Vec<_> = employees
        .iter()
        .filter_map(|e| {
            let end = parse_report_date(e.contract_end.as_deref()?)?;
            ((end - today).num_days() <= within_days).then_some((e, end))
        })
        .collect();
    out.sort_by_key(|(_, end)| *end);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(id: &str, name: &str, status: &str, contract_end: Option<&str>) -> Employee {
        Employee {
            id: id.into(),
            nik: format!("32{id}"),
            name: name.into(),
            email: None,
            phone: None,
            position: Some("Kasir".into()),
            outlet_id: None,
            outlet_name: Some("Mall A".into()),
            status: Some(status.into()),
            join_date: Some("2023-01-01".into()),
            contract_end: contract_end.map(str::to_string),
            salary: None,
            address: None,
            documents: Vec::new(),
            emergency_contact: None,
        }
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let list = vec![
            employee("1", "Budi Santoso", "contract", None),
            employee("2", "Siti", "permanent", None),
        ];
        assert_eq!(search(&list, "budi", None).len(), 1);
        assert_eq!(search(&list, "kasir", None).len(), 2);
        assert_eq!(search(&list, "321", None).len(), 1);
        assert_eq!(search(&list, "", Some("PERMANENT")).len(), 1);
        assert!(search(&list, "nobody", None).is_empty());
    }

    #[test]
    fn contracts_ending_sorted_and_bounded() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).expect("date");
        let list = vec![
            employee("1", "A", "contract", Some("2024-03-20")),
            employee("2", "B", "contract", Some("2024-03-05")),
            employee("3", "C", "contract", Some("2024-06-01")),
            employee("4", "D", "permanent", None),
            employee("5", "E", "contract", Some("2024-02-20")),
        ];
        let ending = contracts_ending(&list, today, 30);
        let ids: Vec<_> = ending.iter().map(|(e, _)| e.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "2", "1"]);
    }
}
