use crate::infra::{InMemoryRequestRepository, OutboxNotifier, StaticVerifier};
use clap::Args;
use inaproperty::config::{DEFAULT_MAX_RISK_SCORE, DEFAULT_OPERATOR_EMAIL};
use inaproperty::error::AppError;
use inaproperty::workflows::console::{render_text, AdminConsole, ServiceConsoleBackend};
use inaproperty::workflows::contact::{
    BotVerdict, ContactPolicy, ContactService, ContactSubmission, RiskPolicy,
};
use inaproperty::workflows::requests::{
    Decision, IndividualSubmission, RequestDeskService, RequestKind, RequestSubmission,
    UniversitySubmission,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Human-likelihood score the simulated bot check reports (0.0 to 1.0)
    #[arg(long, default_value_t = 0.9)]
    pub(crate) visitor_score: f64,
    /// Highest risk score the contact relay admits
    #[arg(long, default_value_t = DEFAULT_MAX_RISK_SCORE)]
    pub(crate) max_risk: f64,
    /// Skip the contact form portion of the demo
    #[arg(long)]
    pub(crate) skip_contact: bool,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            visitor_score: 0.9,
            max_risk: DEFAULT_MAX_RISK_SCORE,
            skip_contact: false,
        }
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        visitor_score,
        max_risk,
        skip_contact,
    } = args;

    println!("Request desk demo");
    let service = Arc::new(RequestDeskService::new(Arc::new(
        InMemoryRequestRepository::default(),
    )));

    let submissions = [
        RequestSubmission::University(UniversitySubmission::new(
            "Test University",
            "John Doe",
            "test@university.edu",
            Some("north_zone".to_string()),
        )),
        RequestSubmission::Individual(IndividualSubmission::new(
            "Jane",
            "Smith",
            "jane@example.com",
            Some("south_zone".to_string()),
        )),
    ];
    let mut created = Vec::new();
    for submission in submissions {
        match service.submit(submission) {
            Ok(record) => {
                println!(
                    "- Submitted {} request for {} -> id {}",
                    record.kind().slug(),
                    record.details.display_name(),
                    record.id
                );
                created.push(record);
            }
            Err(err) => println!("  Submission failed: {err}"),
        }
    }

    let mut console = AdminConsole::new(ServiceConsoleBackend::new(service));
    console.refresh().await;
    println!("\nAdmin console before decisions");
    print_tabs(&mut console);

    for record in &created {
        let decision = match record.kind() {
            RequestKind::University => Decision::Reject,
            RequestKind::Individual => Decision::Approve,
        };
        let applied = console.decide(record.kind(), &record.id, decision).await;
        println!(
            "- {} {} request {} ({})",
            if applied { "Applied" } else { "Ignored" },
            record.kind().slug(),
            record.id,
            decision.verb()
        );
    }

    println!("\nAdmin console after decisions");
    print_tabs(&mut console);

    if skip_contact {
        return Ok(());
    }

    println!("\nContact form demo (simulated visitor score {visitor_score:.2})");
    let outbox = OutboxNotifier::default();
    let contact = ContactService::new(
        Arc::new(StaticVerifier(BotVerdict::passed(Some(visitor_score)))),
        Arc::new(outbox.clone()),
        ContactPolicy {
            operator_email: DEFAULT_OPERATOR_EMAIL.to_string(),
            risk: RiskPolicy {
                max_risk_score: max_risk,
            },
        },
    );

    let submission = ContactSubmission {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: None,
        subject: Some("Student accommodation".to_string()),
        message: "Do you have rooms near campus for September?".to_string(),
        token: Some("demo-proof".to_string()),
    };
    match contact.submit(submission).await {
        Ok(receipt) => println!(
            "- Relayed: {} notifications sent",
            receipt.notifications_sent
        ),
        Err(err) => println!("- Not relayed: {err}"),
    }
    for notification in outbox.sent() {
        println!(
            "  outbox: {} -> {}",
            notification.template.label(),
            notification.to
        );
    }

    Ok(())
}

fn print_tabs(console: &mut AdminConsole<ServiceConsoleBackend<InMemoryRequestRepository>>) {
    for kind in RequestKind::ALL {
        console.select_tab(kind);
        print!("{}", render_text(&console.view()));
    }
}
