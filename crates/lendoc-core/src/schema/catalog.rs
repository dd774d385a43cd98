//! Built-in schemas for lending and legal documents.

use super::{DocumentSchema, FieldSpec};

pub const SANCTION_LETTER: DocumentSchema = DocumentSchema {
    key: "sanction_letter",
    label: "Sanction Letter",
    fields: &[
        FieldSpec::text("customerName", "Full name of the customer/borrower"),
        FieldSpec::text("loanAmount", "The sanctioned loan amount (numeric value only)"),
        FieldSpec::text("propertyAddress", "Complete address of the property"),
        FieldSpec::code("leadID", "The unique lead ID number"),
        FieldSpec::text("propertyOwnerName", "Name of the property owner"),
        FieldSpec::text("emiAmount", "The EMI amount (numeric value only)"),
        FieldSpec::text("tenure", "Loan tenure in months (numeric value only)"),
        FieldSpec::text("ROI", "Rate of interest percentage (numeric value only)"),
        FieldSpec::flag("borrowersSignature", "Whether borrower's signature is present (true/false)"),
        FieldSpec::flag("authorizedSignature", "Whether authorized signature is present (true/false)"),
    ],
    guidance: &["For numeric values, extract only the numbers without currency symbols or text."],
};

pub const LEGAL_REPORT: DocumentSchema = DocumentSchema {
    key: "legal_report",
    label: "Legal Report",
    fields: &[
        FieldSpec::code("leadID", "The unique lead ID number"),
        FieldSpec::text("customerName", "Full name of the customer/borrower"),
        FieldSpec::text("propertyOwnerName", "Name of the property owner"),
        FieldSpec::text("propertyAddress", "Complete address of the property"),
        FieldSpec::text("boundaries", "The four boundaries of the property (North, South, East, West)"),
        FieldSpec::flag("legalVendorSignature", "Whether legal vendor signature is present (true/false)"),
    ],
    guidance: &[
        "For the boundaries, capture the complete description of what exists on each side of the property.",
    ],
};

pub const REPAYMENT_KIT: DocumentSchema = DocumentSchema {
    key: "repayment_kit",
    label: "Repayment Kit",
    fields: &[
        FieldSpec::text("accountHolderName", "Full name of the account holder"),
        FieldSpec::code("accountNumber", "Complete bank account number"),
        FieldSpec::code("ifscCode", "IFSC code of the bank"),
        FieldSpec::text("accountType", "Type of account (Savings/Current)"),
        FieldSpec::flag("customerSignature", "Whether customer signature is present (true/false)"),
        FieldSpec::text("inFavour", "Name of the entity in whose favor the repayment is set up"),
        FieldSpec::text("enachSpdc", "Details about ENACH/SPDC setup"),
    ],
    guidance: &["Pay special attention to bank details and mandate information."],
};

pub const KYC: DocumentSchema = DocumentSchema {
    key: "kyc",
    label: "KYC",
    fields: &[
        FieldSpec::text("name", "Full name of the person"),
        FieldSpec::text("dob", "Date of birth in DD/MM/YYYY format"),
        FieldSpec::text("gender", "Gender (Male/Female/Other)"),
        FieldSpec::text("address", "Complete residential address"),
        FieldSpec::code("kycNumber", "KYC document number (Aadhaar/PAN/etc.)"),
        FieldSpec::code(
            "aadhaarNumber",
            "Aadhaar numbers are usually masked with 8 digits hidden; take the last 4 digits.",
        ),
    ],
    guidance: &[
        "For Aadhaar numbers, check if they are already masked. If not, indicate that the first 8 digits should be masked.",
    ],
};

pub const VETTING_REPORT: DocumentSchema = DocumentSchema {
    key: "vetting_report",
    label: "Vetting Report",
    fields: &[
        FieldSpec::text("date", "Date of the vetting report in DD/MM/YYYY format"),
        FieldSpec::text("customerName", "Full name of the customer/borrower"),
        FieldSpec::flag("legalVendorSignature", "Whether legal vendor signature is present (true/false)"),
    ],
    guidance: &["Pay special attention to dates and signatures."],
};

pub const ANNEXURE: DocumentSchema = DocumentSchema {
    key: "annexure",
    label: "Annexure",
    fields: &[
        FieldSpec::text("date", "Date of the annexure in DD/MM/YYYY format"),
        FieldSpec::code("leadID", "The unique lead ID number"),
        FieldSpec::text("branch", "Branch name or code"),
        FieldSpec::text(
            "customerName",
            "Full name of the customer/borrower, usually in the consent form starting with I am ...",
        ),
        FieldSpec::flag("authorizedSignature", "Whether authorized signature is present (true/false)"),
    ],
    guidance: &["Pay special attention to dates, IDs, and signatures."],
};

pub const MEMORANDUM_OF_TITLE: DocumentSchema = DocumentSchema {
    key: "memorandum_of_title",
    label: "Memorandum of Title",
    fields: &[
        FieldSpec::text("customerName", "Full name of the customer/borrower"),
        FieldSpec::text("loanAmount", "The loan amount (numeric value only)"),
        FieldSpec::text("fourBoundaries", "The four boundaries of the property (North, South, East, West)"),
        FieldSpec::text("propertyAddress", "Complete address of the property"),
        FieldSpec::text("inFavour", "Name of the entity in whose favor the memorandum is created"),
    ],
    guidance: &[
        "For the boundaries, capture the complete description of what exists on each side of the property.",
        "Check if \"Cholamandalam Investment and finance company limited\" is mentioned as the entity in favor.",
    ],
};

const DPN_FIELDS: &[FieldSpec] = &[
    FieldSpec::flag(
        "borrowersSignatures",
        "Whether borrowers' signatures are present on the revenue stamp (true/false)",
    ),
    FieldSpec::code("leadID", "The unique lead ID number"),
    FieldSpec::text("customerName", "Full name of the customer/borrower"),
    FieldSpec::text("loanAmount", "The loan amount (numeric value only)"),
];

const SCHEDULE_PAGE_FIELDS: &[FieldSpec] = &[
    FieldSpec::flag("borrowersSignature", "Whether borrowers' signatures are present (true/false)"),
    FieldSpec::flag(
        "cholaAuthorizedSignature",
        "Whether Chola authorized signature is present (true/false)",
    ),
];

pub const AGREEMENT: DocumentSchema = DocumentSchema {
    key: "agreement",
    label: "Agreement",
    fields: &[
        FieldSpec::group("dpn", DPN_FIELDS),
        FieldSpec::group("schedulePage", SCHEDULE_PAGE_FIELDS),
    ],
    guidance: &["Pay special attention to signatures and stamps."],
};

/// Every schema the default registry knows about.
pub const BUILTIN_SCHEMAS: &[DocumentSchema] = &[
    SANCTION_LETTER,
    LEGAL_REPORT,
    REPAYMENT_KIT,
    KYC,
    VETTING_REPORT,
    ANNEXURE,
    MEMORANDUM_OF_TITLE,
    AGREEMENT,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_canonical_and_unique() {
        let mut seen = HashSet::new();
        for schema in BUILTIN_SCHEMAS {
            assert_eq!(schema.key, schema.key.to_lowercase().replace(' ', "_"));
            assert_eq!(schema.key, schema.label.to_lowercase().replace(' ', "_"));
            assert!(seen.insert(schema.key), "duplicate key {}", schema.key);
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn test_field_names_unique_per_schema() {
        for schema in BUILTIN_SCHEMAS {
            let names: HashSet<_> = schema.field_names().collect();
            assert_eq!(names.len(), schema.fields.len(), "{}", schema.key);
        }
    }

    #[test]
    fn test_repayment_kit_flags() {
        let flags: Vec<_> = REPAYMENT_KIT
            .fields
            .iter()
            .filter(|f| f.kind == FieldKind::Flag)
            .map(|f| f.name)
            .collect();
        assert_eq!(flags, vec!["customerSignature"]);
    }
}
