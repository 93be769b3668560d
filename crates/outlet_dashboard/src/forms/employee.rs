use std::sync::LazyLock;

use chrono::NaiveDate;
use outlet_dashboard_client::utils::parse_report_date;
use outlet_dashboard_client::{EmergencyContact, Employee, EmployeePayload, EmploymentStatus};
use regex::Regex;

use super::{FieldErrors, blank_to_none, is_valid_email, is_valid_phone};

static NIK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,20}$").expect("nik regex is valid"));

/// "4.500.000" style thousands grouping.
static GROUPED_AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,3}(\.[0-9]{3})+$").expect("amount regex is valid")
});

/// Backend field names that differ from the form's. `EmployeePayload`
/// serializes under the same names.
pub const SERVER_FIELD_ALIASES: &[(&str, &str)] = &[
    ("nama", "name"),
    ("no_hp", "phone"),
    ("jabatan", "position"),
    ("tanggal_masuk", "join_date"),
    ("tanggal_akhir_kontrak", "contract_end"),
    ("gaji", "salary"),
    ("alamat", "address"),
];

/// Raw input of the employee create/edit form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmployeeForm {
    pub nik: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub outlet_id: String,
    pub status: String,
    pub join_date: String,
    pub contract_end: String,
    pub salary: String,
    pub address: String,
    pub documents: Vec<String>,
    pub emergency_name: String,
    pub emergency_phone: String,
    pub emergency_relation: String,
}

impl EmployeeForm {
    /// Prefill the edit form from an existing record.
    pub fn from_employee(e: &Employee) -> Self {
        let contact = e.emergency_contact.clone().unwrap_or_default();
        Self {
            nik: e.nik.clone(),
            name: e.name.clone(),
            email: e.email.clone().unwrap_or_default(),
            phone: e.phone.clone().unwrap_or_default(),
            position: e.position.clone().unwrap_or_default(),
            outlet_id: e.outlet_id.clone().unwrap_or_default(),
            status: e.status.clone().unwrap_or_default(),
            join_date: e
                .join_date
                .as_deref()
                .and_then(parse_report_date)
                .map(|d| d.to_string())
                .unwrap_or_default(),
            contract_end: e
                .contract_end
                .as_deref()
                .and_then(parse_report_date)
                .map(|d| d.to_string())
                .unwrap_or_default(),
            salary: e.salary.map(|s| format!("{s:.0}")).unwrap_or_default(),
            address: e.address.clone().unwrap_or_default(),
            documents: e.documents.clone(),
            emergency_name: contact.name.unwrap_or_default(),
            emergency_phone: contact.phone.unwrap_or_default(),
            emergency_relation: contact.relation.unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> FieldErrors {
        self.to_payload().err().unwrap_or_default()
    }

    /// Validate and coerce the form into the request body in one pass:
    /// blank strings become `None`, dates and amounts are parsed, and the
    /// document list and emergency contact default to empty values.
    pub fn to_payload(&self) -> Result<EmployeePayload, FieldErrors> {
        let mut errors = FieldErrors::new();

        let nik = self.nik.trim().to_string();
        if nik.is_empty() {
            errors.add("nik", "NIK is required.");
        } else if !NIK_RE.is_match(&nik) {
            errors.add("nik", "NIK must contain digits only.");
        }

        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.add("name", "Name is required.");
        }

        let email = blank_to_none(&self.email).map(|e| e.to_lowercase());
        if email.as_deref().is_some_and(|e| !is_valid_email(e)) {
            errors.add("email", "Email format is invalid.");
        }

        let phone = blank_to_none(&self.phone);
        if phone.as_deref().is_some_and(|p| !is_valid_phone(p)) {
            errors.add("phone", "Phone number format is invalid.");
        }

        let status = match blank_to_none(&self.status) {
            None => {
                errors.add("status", "Employment status is required.");
                None
            }
            Some(raw) => {
                let parsed = EmploymentStatus::parse(&raw);
                if parsed.is_none() {
                    errors.add("status", "Employment status is not recognized.");
                }
                parsed
            }
        };

        let join_date = parse_date_field(&mut errors, "join_date", &self.join_date, true);
        let contract_end =
            parse_date_field(&mut errors, "contract_end", &self.contract_end, false);
        if status == Some(EmploymentStatus::Contract)
            && contract_end.is_none()
            && errors.get("contract_end").is_none()
        {
            errors.add("contract_end", "Contract end date is required for contract staff.");
        }
        if let (Some(join), Some(end)) = (join_date, contract_end) {
            if end <= join {
                errors.add("contract_end", "Contract end date must be after the join date.");
            }
        }

        let salary = match blank_to_none(&self.salary) {
            None => None,
            Some(raw) => match parse_amount(&raw) {
                Some(v) if v >= 0.0 => Some(v),
                _ => {
                    errors.add("salary", "Salary must be a non-negative number.");
                    None
                }
            },
        };

        let (Some(status), Some(join_date)) = (status, join_date) else {
            return Err(errors);
        };
        errors.into_result(EmployeePayload {
            nik,
            name,
            email,
            phone,
            position: blank_to_none(&self.position),
            outlet_id: blank_to_none(&self.outlet_id),
            status,
            join_date,
            contract_end,
            salary,
            address: blank_to_none(&self.address),
            documents: self
                .documents
                .iter()
                .filter_map(|d| blank_to_none(d))
                .collect(),
            emergency_contact: EmergencyContact {
                name: blank_to_none(&self.emergency_name),
                phone: blank_to_none(&self.emergency_phone),
                relation: blank_to_none(&self.emergency_relation),
            },
        })
    }
}

fn parse_date_field(
    errors: &mut FieldErrors,
    field: &str,
    raw: &str,
    required: bool,
) -> Option<NaiveDate> {
    match blank_to_none(raw) {
        None => {
            if required {
                errors.add(field, "This date is required.");
            }
            None
        }
        Some(s) => {
            let parsed = NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok();
            if parsed.is_none() {
                errors.add(field, "Date must be in YYYY-MM-DD format.");
            }
            parsed
        }
    }
}

/// Parse "4500000", "4500000.50", "Rp 4.500.000" or "4,500,000".
fn parse_amount(raw: &str) -> Option<f64> {
    let s: String = raw
        .trim()
        .trim_start_matches("Rp")
        .trim_start_matches("rp")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    let s = if GROUPED_AMOUNT_RE.is_match(&s) {
        s.replace('.', "")
    } else {
        s
    };
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// JSON schema of the employee request body.
pub fn payload_schema() -> schemars::Schema {
    schemars::schema_for!(EmployeePayload)
}
