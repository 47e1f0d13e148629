//! Seed opportunities for running the board without a backend.
//!
//! Ids are `"1"`..`"10"` and every record is unpersisted, so moves on them
//! stay local. [`persisted_seed`] gives the same records with UUIDs for the
//! local backend.

use chrono::{DateTime, Duration, Utc};

use super::models::{ContactSummary, Opportunity, PipelineStage, Temperature};

struct Seed {
    id: &'static str,
    first: &'static str,
    last: &'static str,
    service: &'static str,
    stage: PipelineStage,
    temperature: Temperature,
    source: &'static str,
    referred_by: Option<&'static str>,
    agent: &'static str,
    carrier: Option<&'static str>,
    product: Option<&'static str>,
    premium: f64,
    amount: f64,
    created_days_ago: i64,
    updated_days_ago: i64,
    follow_up_in: i64,
    close_in: i64,
    locked_days_ago: Option<i64>,
}

const SEEDS: [Seed; 10] = [
    Seed {
        id: "1",
        first: "John",
        last: "Smith",
        service: "Life Insurance",
        stage: PipelineStage::LeadsInterest,
        temperature: Temperature::Hot,
        source: "Referral",
        referred_by: Some("Jane Doe"),
        agent: "Agent 1",
        carrier: None,
        product: None,
        premium: 5000.0,
        amount: 50000.0,
        created_days_ago: 5,
        updated_days_ago: 1,
        follow_up_in: 2,
        close_in: 30,
        locked_days_ago: None,
    },
    Seed {
        id: "2",
        first: "Sarah",
        last: "Johnson",
        service: "Annuity",
        stage: PipelineStage::LeadsInterest,
        temperature: Temperature::Warm,
        source: "Website",
        referred_by: None,
        agent: "Agent 1",
        carrier: None,
        product: None,
        premium: 8000.0,
        amount: 100000.0,
        created_days_ago: 10,
        updated_days_ago: 2,
        follow_up_in: 5,
        close_in: 45,
        locked_days_ago: None,
    },
    Seed {
        id: "3",
        first: "Michael",
        last: "Brown",
        service: "Medicare",
        stage: PipelineStage::ProspectQuote,
        temperature: Temperature::Hot,
        source: "Cold Call",
        referred_by: None,
        agent: "Agent 2",
        carrier: None,
        product: None,
        premium: 3000.0,
        amount: 30000.0,
        created_days_ago: 15,
        updated_days_ago: 3,
        follow_up_in: 1,
        close_in: 20,
        locked_days_ago: None,
    },
    Seed {
        id: "4",
        first: "Emily",
        last: "Davis",
        service: "Life Insurance",
        stage: PipelineStage::ProspectQuote,
        temperature: Temperature::Warm,
        source: "Referral",
        referred_by: Some("John Smith"),
        agent: "Agent 1",
        carrier: None,
        product: None,
        premium: 6000.0,
        amount: 60000.0,
        created_days_ago: 20,
        updated_days_ago: 4,
        follow_up_in: 3,
        close_in: 35,
        locked_days_ago: None,
    },
    Seed {
        id: "5",
        first: "Robert",
        last: "Wilson",
        service: "Annuity",
        stage: PipelineStage::ProspectAppSigned,
        temperature: Temperature::Hot,
        source: "Website",
        referred_by: None,
        agent: "Agent 2",
        carrier: None,
        product: None,
        premium: 10000.0,
        amount: 150000.0,
        created_days_ago: 25,
        updated_days_ago: 5,
        follow_up_in: 7,
        close_in: 15,
        locked_days_ago: None,
    },
    Seed {
        id: "6",
        first: "Lisa",
        last: "Anderson",
        service: "Life Insurance",
        stage: PipelineStage::ProspectUnderwriting,
        temperature: Temperature::Hot,
        source: "Referral",
        referred_by: Some("Sarah Johnson"),
        agent: "Agent 1",
        carrier: Some("ABC Insurance"),
        product: Some("Term Life 20"),
        premium: 4500.0,
        amount: 45000.0,
        created_days_ago: 30,
        updated_days_ago: 6,
        follow_up_in: 10,
        close_in: 10,
        locked_days_ago: None,
    },
    Seed {
        id: "7",
        first: "David",
        last: "Martinez",
        service: "Medicare",
        stage: PipelineStage::ProspectUnderwriting,
        temperature: Temperature::Warm,
        source: "Cold Call",
        referred_by: None,
        agent: "Agent 2",
        carrier: Some("XYZ Medicare"),
        product: None,
        premium: 2500.0,
        amount: 25000.0,
        created_days_ago: 40,
        updated_days_ago: 7,
        follow_up_in: 14,
        close_in: 25,
        locked_days_ago: None,
    },
    Seed {
        id: "8",
        first: "Jennifer",
        last: "Taylor",
        service: "Life Insurance",
        stage: PipelineStage::ClientWonInForce,
        temperature: Temperature::Hot,
        source: "Referral",
        referred_by: Some("Emily Davis"),
        agent: "Agent 1",
        carrier: Some("ABC Insurance"),
        product: Some("Whole Life"),
        premium: 7000.0,
        amount: 70000.0,
        created_days_ago: 60,
        updated_days_ago: 10,
        follow_up_in: 30,
        close_in: -10,
        locked_days_ago: Some(10),
    },
    Seed {
        id: "9",
        first: "James",
        last: "Thomas",
        service: "Annuity",
        stage: PipelineStage::ClientWonInForce,
        temperature: Temperature::Warm,
        source: "Website",
        referred_by: None,
        agent: "Agent 2",
        carrier: Some("Secure Annuities"),
        product: Some("Fixed Indexed"),
        premium: 12000.0,
        amount: 200000.0,
        created_days_ago: 90,
        updated_days_ago: 15,
        follow_up_in: 60,
        close_in: -15,
        locked_days_ago: Some(15),
    },
    Seed {
        id: "10",
        first: "Patricia",
        last: "Moore",
        service: "Medicare",
        stage: PipelineStage::LostLost,
        temperature: Temperature::Cold,
        source: "Cold Call",
        referred_by: None,
        agent: "Agent 2",
        carrier: None,
        product: None,
        premium: 4000.0,
        amount: 40000.0,
        created_days_ago: 50,
        updated_days_ago: 20,
        follow_up_in: 0,
        close_in: -5,
        locked_days_ago: None,
    },
];

fn build(seed: &Seed, now: DateTime<Utc>) -> Opportunity {
    let contact_id = format!("contact-{}", seed.id);
    let mut opp = Opportunity::new(
        seed.id,
        format!("{} {} - {}", seed.first, seed.last, seed.service),
        seed.stage,
    );
    opp.service = Some(seed.service.to_string());
    opp.create_date = now - Duration::days(seed.created_days_ago);
    opp.temperature = Some(seed.temperature);
    opp.next_follow_up = Some(now + Duration::days(seed.follow_up_in));
    opp.estimate_close_target = Some(now + Duration::days(seed.close_in));
    opp.opportunity_source = Some(seed.source.to_string());
    opp.referred_by = seed.referred_by.map(str::to_string);
    opp.writing_agent = Some(seed.agent.to_string());
    opp.carrier = seed.carrier.map(str::to_string);
    opp.product = seed.product.map(str::to_string);
    opp.est_annual_premium = Some(seed.premium);
    opp.opportunity_amount = Some(seed.amount);
    opp.agent_id = "agent-1".to_string();
    opp.contact = Some(ContactSummary {
        id: contact_id.clone(),
        first_name: seed.first.to_string(),
        last_name: seed.last.to_string(),
        email: format!(
            "{}.{}@example.com",
            seed.first.to_lowercase(),
            seed.last.to_lowercase()
        ),
        phone_number: Some(format!("+1-555-01{:0>2}", seed.id)),
    });
    opp.contact_id = contact_id;
    opp.created_at = opp.create_date;
    opp.updated_at = now - Duration::days(seed.updated_days_ago);
    if let Some(days) = seed.locked_days_ago {
        opp.is_locked = true;
        opp.locked_at = Some(now - Duration::days(days));
        opp.locked_by = Some("agent-1".to_string());
    }
    opp
}

/// Ten unpersisted demo opportunities, dated relative to `now`.
pub fn demo_opportunities(now: DateTime<Utc>) -> Vec<Opportunity> {
    SEEDS
        .iter()
        .map(|seed| build(seed, now).unpersisted())
        .collect()
}

/// The demo records with fresh UUIDs, for seeding a backend.
pub fn persisted_seed(now: DateTime<Utc>) -> Vec<Opportunity> {
    SEEDS
        .iter()
        .map(|seed| {
            let mut opp = build(seed, now);
            opp.id = uuid::Uuid::new_v4().to_string();
            opp
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::grouping::GroupedOpportunities;

    #[test]
    fn test_demo_layout() {
        let opps = demo_opportunities(Utc::now());
        assert_eq!(opps.len(), 10);
        assert!(opps.iter().all(|o| !o.persisted));

        let grouped = GroupedOpportunities::group(&opps);
        let counts = grouped.counts();
        assert_eq!(counts[&PipelineStage::LeadsInterest], 2);
        assert_eq!(counts[&PipelineStage::ProspectQuote], 2);
        assert_eq!(counts[&PipelineStage::ProspectAppSigned], 1);
        assert_eq!(counts[&PipelineStage::ProspectUnderwriting], 2);
        assert_eq!(counts[&PipelineStage::ClientWonInForce], 2);
        assert_eq!(counts[&PipelineStage::LostLost], 1);
    }

    #[test]
    fn test_only_in_force_records_are_locked() {
        let opps = demo_opportunities(Utc::now());
        for opp in &opps {
            assert_eq!(
                opp.is_locked,
                opp.pipeline_stage == PipelineStage::ClientWonInForce,
                "record {}",
                opp.id
            );
        }
        let eight = opps.iter().find(|o| o.id == "8").unwrap();
        assert_eq!(eight.locked_by.as_deref(), Some("agent-1"));
    }

    #[test]
    fn test_persisted_seed_uses_uuids() {
        let opps = persisted_seed(Utc::now());
        assert!(opps.iter().all(|o| o.persisted));
        assert!(opps.iter().all(|o| uuid::Uuid::try_parse(&o.id).is_ok()));
        assert_eq!(
            opps[0].contact_name().as_deref(),
            Some("John Smith"),
        );
    }
}
