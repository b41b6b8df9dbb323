pub mod csv_table;
pub mod error;
pub mod loader;
pub mod sources;
pub mod store;

pub use csv_table::{CsvTable, TableRow, read_csv_table};
pub use error::{IngestError, Result};
pub use loader::{CodeTableReport, IngestReport, load_encounters};
pub use sources::{
    ADMISSION_DX_FILE, CodeSource, DIAGNOSIS_FILE, ENCOUNTER_ID_COLUMN, PATIENT_FILE,
    SourceFiles, TREATMENT_FILE, patient_columns,
};
pub use store::{
    AdmissionRecord, AdmissionStats, EncounterStore, MergeStats, readmission_labels,
};
