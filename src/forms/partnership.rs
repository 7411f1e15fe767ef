use once_cell::sync::Lazy;
use serde::Serialize;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub name: &'static str,
    pub price: &'static str,
    pub description: &'static str,
    pub features: Vec<&'static str>,
    pub popular: bool,
    /// Plans that need a contact request to activate carry the prefilled message.
    pub activation_message: Option<String>,
}

pub static PLANS: Lazy<Vec<Plan>> = Lazy::new(|| {
    vec![
        Plan {
            name: "Basic",
            price: "Free",
            description: "Perfect for getting started",
            features: vec![
                "Basic restaurant listing",
                "Customer reviews",
                "Basic analytics",
                "Standard support",
            ],
            popular: false,
            activation_message: None,
        },
        Plan {
            name: "Pro",
            price: "₹299/month",
            description: "For growing restaurants",
            features: vec![
                "Enhanced restaurant profile",
                "Priority listing placement",
                "Advanced analytics",
                "Customer insights",
                "Photo gallery management",
                "Review management tools",
                "Priority support",
            ],
            popular: true,
            activation_message: Some(activation_message("Pro")),
        },
        Plan {
            name: "Premium",
            price: "₹599/month",
            description: "For established restaurants",
            features: vec![
                "Everything in Pro",
                "Featured restaurant badge",
                "Custom branding options",
                "Marketing campaign tools",
                "Dedicated account manager",
                "API access",
                "24/7 premium support",
            ],
            popular: false,
            activation_message: Some(activation_message("Premium")),
        },
    ]
});

pub fn activation_message(plan_name: &str) -> String {
    format!(
        "Hi! I want to activate my {plan_name} subscription for my restaurant. Please provide me with the details to get started."
    )
}

pub fn find_plan(name: &str) -> Result<&'static Plan, AppError> {
    PLANS
        .iter()
        .find(|plan| plan.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| AppError::NotFound(format!("Unknown plan: {name}")))
}
