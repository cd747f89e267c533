use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::treatments::handlers::{treatment_handler, treatment_plan_handler};
use crate::features::treatments::services::{TreatmentPlanService, TreatmentService};

pub fn routes(
    treatments: Arc<TreatmentService>,
    plans: Arc<TreatmentPlanService>,
) -> Router {
    let catalog = Router::new()
        .route(
            "/api/treatments",
            get(treatment_handler::list_treatments).post(treatment_handler::create_treatment),
        )
        .route(
            "/api/treatments/{id}",
            get(treatment_handler::get_treatment)
                .put(treatment_handler::update_treatment)
                .delete(treatment_handler::delete_treatment),
        )
        .with_state(treatments);

    let plans = Router::new()
        .route(
            "/api/treatment-plans",
            get(treatment_plan_handler::list_treatment_plans)
                .post(treatment_plan_handler::create_treatment_plan),
        )
        .route(
            "/api/treatment-plans/{id}",
            get(treatment_plan_handler::get_treatment_plan)
                .put(treatment_plan_handler::update_treatment_plan)
                .delete(treatment_plan_handler::cancel_treatment_plan),
        )
        .with_state(plans);

    catalog.merge(plans)
}
