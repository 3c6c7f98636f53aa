//! Forms module
//!
//! Field validation, the generic create/edit modal and the resource table.

pub mod field;
pub mod modal;
pub mod resources;
pub mod table;

pub use field::{validate_fields, FieldSpec, FieldValue};
pub use modal::{Modal, ModalMode, ModalState, ResourceForm, Submission};
pub use resources::{
    BulletinForm, ClassificatorForm, DepartmentForm, ElementForm, OrganizationForm, OrganizationSelection, UserForm,
};
pub use table::{BulkDeleteReport, ResourceTable, TableRow};
