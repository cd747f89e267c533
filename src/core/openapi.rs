use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::appointments::{
    dtos as appointments_dtos, handlers as appointments_handlers, models as appointments_models,
};
use crate::features::auth;
use crate::features::billing::{
    dtos as billing_dtos, handlers as billing_handlers, models as billing_models,
};
use crate::features::clinics::{dtos as clinics_dtos, handlers as clinics_handlers};
use crate::features::communications::{
    dtos as communications_dtos, handlers as communications_handlers,
    models as communications_models,
};
use crate::features::documents::{
    dtos as documents_dtos, handlers as documents_handlers, models as documents_models,
};
use crate::features::notifications::{
    dtos as notifications_dtos, handlers as notifications_handlers,
    models as notifications_models,
};
use crate::features::organizations::{
    dtos as organizations_dtos, handlers as organizations_handlers,
    models as organizations_models,
};
use crate::features::patients::{
    dtos as patients_dtos, handlers as patients_handlers, models as patients_models,
};
use crate::features::prescriptions::{
    dtos as prescriptions_dtos, handlers as prescriptions_handlers, models as prescriptions_models,
};
use crate::features::reports::{dtos as reports_dtos, handlers as reports_handlers};
use crate::features::staff::{dtos as staff_dtos, handlers as staff_handlers, models as staff_models};
use crate::features::treatments::{
    dtos as treatments_dtos, handlers as treatments_handlers, models as treatments_models,
};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::shared::types::{Address, ApiResponse, Meta, SortDirection};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::get_me,
        // Users
        users_handlers::list_users,
        users_handlers::get_user,
        users_handlers::get_profile,
        users_handlers::update_profile,
        users_handlers::change_password,
        // Organizations
        organizations_handlers::create_organization,
        organizations_handlers::get_current,
        organizations_handlers::update_current,
        organizations_handlers::get_settings,
        organizations_handlers::update_settings,
        organizations_handlers::search_organizations,
        organizations_handlers::request_to_join,
        organizations_handlers::list_join_requests,
        organizations_handlers::my_join_requests,
        organizations_handlers::approve_join_request,
        organizations_handlers::deny_join_request,
        organizations_handlers::list_members,
        organizations_handlers::change_member_role,
        organizations_handlers::remove_member,
        // Clinics
        clinics_handlers::list_clinics,
        clinics_handlers::get_clinic,
        clinics_handlers::create_clinic,
        clinics_handlers::update_clinic,
        clinics_handlers::delete_clinic,
        // Patients
        patients_handlers::list_patients,
        patients_handlers::get_patient,
        patients_handlers::create_patient,
        patients_handlers::update_patient,
        patients_handlers::delete_patient,
        // Documents
        documents_handlers::upload_document,
        documents_handlers::list_documents,
        documents_handlers::get_document,
        documents_handlers::update_document,
        documents_handlers::archive_document,
        documents_handlers::restore_document,
        documents_handlers::download_document,
        // Staff
        staff_handlers::list_staff,
        staff_handlers::get_staff,
        staff_handlers::create_staff,
        staff_handlers::update_staff,
        staff_handlers::delete_staff,
        // Appointments
        appointments_handlers::list_appointments,
        appointments_handlers::get_appointment,
        appointments_handlers::create_appointment,
        appointments_handlers::update_appointment,
        appointments_handlers::update_appointment_status,
        appointments_handlers::cancel_appointment,
        // Treatments
        treatments_handlers::list_treatments,
        treatments_handlers::get_treatment,
        treatments_handlers::create_treatment,
        treatments_handlers::update_treatment,
        treatments_handlers::delete_treatment,
        treatments_handlers::list_treatment_plans,
        treatments_handlers::get_treatment_plan,
        treatments_handlers::create_treatment_plan,
        treatments_handlers::update_treatment_plan,
        treatments_handlers::cancel_treatment_plan,
        // Prescriptions
        prescriptions_handlers::list_prescriptions,
        prescriptions_handlers::get_prescription,
        prescriptions_handlers::create_prescription,
        prescriptions_handlers::update_prescription,
        prescriptions_handlers::delete_prescription,
        // Billing
        billing_handlers::list_invoices,
        billing_handlers::get_invoice,
        billing_handlers::create_invoice,
        billing_handlers::update_invoice,
        billing_handlers::cancel_invoice,
        billing_handlers::list_payments,
        billing_handlers::record_payment,
        billing_handlers::download_pdf,
        billing_handlers::download_csv,
        billing_handlers::download_html,
        billing_handlers::export_invoices,
        // Notifications
        notifications_handlers::list_notifications,
        notifications_handlers::unread_count,
        notifications_handlers::mark_read,
        notifications_handlers::mark_all_read,
        notifications_handlers::delete_notification,
        notifications_handlers::broadcast,
        // Communications
        communications_handlers::list_communications,
        communications_handlers::get_communication,
        communications_handlers::create_communication,
        communications_handlers::update_communication,
        communications_handlers::delete_communication,
        // Reports
        reports_handlers::get_summary,
        reports_handlers::get_revenue,
        reports_handlers::get_appointments,
        reports_handlers::get_top_treatments,
    ),
    components(
        schemas(
            // Shared
            Meta,
            Address,
            SortDirection,
            // Auth
            auth::model::UserRole,
            auth::model::AuthenticatedUser,
            auth::dtos::RegisterRequestDto,
            auth::dtos::LoginRequestDto,
            auth::dtos::AuthResponseDto,
            ApiResponse<auth::dtos::AuthResponseDto>,
            // Users
            users_dtos::UserResponseDto,
            users_dtos::UpdateProfileDto,
            users_dtos::ChangePasswordDto,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<Vec<users_dtos::UserResponseDto>>,
            // Organizations
            organizations_models::JoinRequestStatus,
            organizations_dtos::OrganizationResponseDto,
            organizations_dtos::OrganizationSummaryDto,
            organizations_dtos::CreateOrganizationDto,
            organizations_dtos::UpdateOrganizationDto,
            organizations_dtos::OrganizationSettingsDto,
            organizations_dtos::UpdateSettingsDto,
            organizations_dtos::JoinRequestResponseDto,
            organizations_dtos::CreateJoinRequestDto,
            organizations_dtos::ApproveJoinRequestDto,
            organizations_dtos::ChangeMemberRoleDto,
            ApiResponse<organizations_dtos::OrganizationResponseDto>,
            ApiResponse<Vec<organizations_dtos::OrganizationSummaryDto>>,
            ApiResponse<organizations_dtos::OrganizationSettingsDto>,
            ApiResponse<organizations_dtos::JoinRequestResponseDto>,
            ApiResponse<Vec<organizations_dtos::JoinRequestResponseDto>>,
            // Clinics
            clinics_dtos::ClinicResponseDto,
            clinics_dtos::CreateClinicDto,
            clinics_dtos::UpdateClinicDto,
            ApiResponse<clinics_dtos::ClinicResponseDto>,
            ApiResponse<Vec<clinics_dtos::ClinicResponseDto>>,
            // Patients
            patients_models::PatientGender,
            patients_dtos::EmergencyContact,
            patients_dtos::PatientSortBy,
            patients_dtos::PatientResponseDto,
            patients_dtos::CreatePatientDto,
            patients_dtos::UpdatePatientDto,
            ApiResponse<patients_dtos::PatientResponseDto>,
            ApiResponse<Vec<patients_dtos::PatientResponseDto>>,
            // Documents
            documents_models::DocumentCategory,
            documents_dtos::UploadDocumentDto,
            documents_dtos::DocumentResponseDto,
            documents_dtos::UpdateDocumentDto,
            documents_dtos::DocumentDownloadDto,
            ApiResponse<documents_dtos::DocumentResponseDto>,
            ApiResponse<Vec<documents_dtos::DocumentResponseDto>>,
            ApiResponse<documents_dtos::DocumentDownloadDto>,
            // Staff
            staff_models::StaffRole,
            staff_dtos::StaffResponseDto,
            staff_dtos::CreateStaffDto,
            staff_dtos::UpdateStaffDto,
            ApiResponse<staff_dtos::StaffResponseDto>,
            ApiResponse<Vec<staff_dtos::StaffResponseDto>>,
            // Appointments
            appointments_models::AppointmentStatus,
            appointments_dtos::AppointmentResponseDto,
            appointments_dtos::CreateAppointmentDto,
            appointments_dtos::UpdateAppointmentDto,
            appointments_dtos::UpdateAppointmentStatusDto,
            ApiResponse<appointments_dtos::AppointmentResponseDto>,
            ApiResponse<Vec<appointments_dtos::AppointmentResponseDto>>,
            // Treatments
            treatments_models::TreatmentPlanStatus,
            treatments_dtos::TreatmentResponseDto,
            treatments_dtos::CreateTreatmentDto,
            treatments_dtos::UpdateTreatmentDto,
            treatments_dtos::TreatmentPlanItemDto,
            treatments_dtos::TreatmentPlanItemInput,
            treatments_dtos::TreatmentPlanResponseDto,
            treatments_dtos::CreateTreatmentPlanDto,
            treatments_dtos::UpdateTreatmentPlanDto,
            ApiResponse<treatments_dtos::TreatmentResponseDto>,
            ApiResponse<Vec<treatments_dtos::TreatmentResponseDto>>,
            ApiResponse<treatments_dtos::TreatmentPlanResponseDto>,
            ApiResponse<Vec<treatments_dtos::TreatmentPlanResponseDto>>,
            // Prescriptions
            prescriptions_models::Medication,
            prescriptions_dtos::PrescriptionResponseDto,
            prescriptions_dtos::CreatePrescriptionDto,
            prescriptions_dtos::UpdatePrescriptionDto,
            ApiResponse<prescriptions_dtos::PrescriptionResponseDto>,
            ApiResponse<Vec<prescriptions_dtos::PrescriptionResponseDto>>,
            // Billing
            billing_models::PaymentStatus,
            billing_models::PaymentMethod,
            billing_dtos::InvoiceItemDto,
            billing_dtos::PaymentResponseDto,
            billing_dtos::InvoiceResponseDto,
            billing_dtos::InvoiceItemInput,
            billing_dtos::CreateInvoiceDto,
            billing_dtos::UpdateInvoiceDto,
            billing_dtos::RecordPaymentDto,
            ApiResponse<billing_dtos::InvoiceResponseDto>,
            ApiResponse<Vec<billing_dtos::InvoiceResponseDto>>,
            ApiResponse<Vec<billing_dtos::PaymentResponseDto>>,
            // Notifications
            notifications_models::NotificationKind,
            notifications_dtos::NotificationResponseDto,
            notifications_dtos::UnreadCountDto,
            notifications_dtos::MarkAllReadDto,
            notifications_dtos::BroadcastNotificationDto,
            notifications_dtos::BroadcastResultDto,
            ApiResponse<Vec<notifications_dtos::NotificationResponseDto>>,
            ApiResponse<notifications_dtos::NotificationResponseDto>,
            ApiResponse<notifications_dtos::UnreadCountDto>,
            ApiResponse<notifications_dtos::MarkAllReadDto>,
            ApiResponse<notifications_dtos::BroadcastResultDto>,
            // Communications
            communications_models::CommunicationChannel,
            communications_models::CommunicationStatus,
            communications_dtos::CommunicationResponseDto,
            communications_dtos::CreateCommunicationDto,
            communications_dtos::UpdateCommunicationDto,
            ApiResponse<communications_dtos::CommunicationResponseDto>,
            ApiResponse<Vec<communications_dtos::CommunicationResponseDto>>,
            // Reports
            reports_dtos::ReportSummaryDto,
            reports_dtos::RevenuePointDto,
            reports_dtos::StatusCountDto,
            reports_dtos::AppointmentBreakdownDto,
            reports_dtos::TopTreatmentDto,
            ApiResponse<reports_dtos::ReportSummaryDto>,
            ApiResponse<Vec<reports_dtos::RevenuePointDto>>,
            ApiResponse<reports_dtos::AppointmentBreakdownDto>,
            ApiResponse<Vec<reports_dtos::TopTreatmentDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and current user"),
        (name = "users", description = "User accounts and profiles"),
        (name = "organizations", description = "Organizations, settings, join requests and members"),
        (name = "clinics", description = "Clinics of the organization"),
        (name = "patients", description = "Patient records"),
        (name = "documents", description = "Patient documents (uploads)"),
        (name = "staff", description = "Clinic staff"),
        (name = "appointments", description = "Appointment scheduling"),
        (name = "treatments", description = "Treatment catalog"),
        (name = "treatment-plans", description = "Per-patient treatment plans"),
        (name = "prescriptions", description = "Prescriptions"),
        (name = "billing", description = "Invoices, payments and exports"),
        (name = "notifications", description = "Per-user notification inbox"),
        (name = "communications", description = "Patient communication log"),
        (name = "reports", description = "Dashboard aggregates"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "DentOS API",
        version = "0.1.0",
        description = "API documentation for DentOS",
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_billing_and_security() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/billing/{id}/pdf"));
        assert!(doc.paths.paths.contains_key("/api/organizations/join-requests/{id}/approve"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn test_openapi_lists_admin_guarded_operations() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        let clinics = paths.get("/api/clinics").expect("clinics path");
        assert!(clinics.post.is_some());
        let clinic = paths.get("/api/clinics/{id}").expect("clinic path");
        assert!(clinic.put.is_some());
        assert!(clinic.delete.is_some());

        let treatments = paths.get("/api/treatments").expect("treatments path");
        assert!(treatments.post.is_some());
        let treatment = paths.get("/api/treatments/{id}").expect("treatment path");
        assert!(treatment.put.is_some());
        assert!(treatment.delete.is_some());

        let notifications = paths.get("/api/notifications").expect("notifications path");
        assert!(notifications.post.is_some());

        assert!(paths.contains_key("/api/organizations/settings"));
        assert!(paths.contains_key("/api/organizations/join-requests"));
    }
}
