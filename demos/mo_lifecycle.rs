//! 製令生命週期示範
//!
//! 執行：`RUST_LOG=debug cargo run --example mo_lifecycle`

use chrono::{Duration, Utc};
use mfg::engine::LifecycleController;
use mfg::model::*;
use rust_decimal_macros::dec;
use serde_json::Map;

fn main() -> anyhow::Result<()> {
    mfg::logging::init();

    let controller = LifecycleController::default();

    let product = Product::new(
        "TABLE-001".to_string(),
        "SKU-TABLE-001".to_string(),
        ProductType::FinishedGood,
    );

    let bom = Bom::create(NewBom {
        product_id: product.id.clone(),
        version: "v1".to_string(),
        name: "Oak table".to_string(),
        description: None,
        components: vec![
            BomComponent::new("OAK-BOARD".to_string(), Quantity::new(dec!(4), "pcs")?, 10)
                .with_scrap_factor(dec!(0.25)),
            BomComponent::new("TABLE-LEG".to_string(), Quantity::new(dec!(4), "pcs")?, 20),
            BomComponent::new("VARNISH".to_string(), Quantity::new(dec!(0.2), "L")?, 30),
        ],
        created_by: "engineer".to_string(),
    })?
    .approve("qa-lead")?;

    let mo = controller.open(
        &product,
        &bom,
        NewManufacturingOrder {
            mo_number: "MO-DEMO-001".to_string(),
            product_id: product.id.clone(),
            bom_id: bom.id(),
            quantity: Quantity::new(dec!(20), "pcs")?,
            priority: MoPriority::Normal,
            planned_start_date: Some(Utc::now()),
            planned_end_date: Some(Utc::now() + Duration::hours(12)),
            created_by: "planner".to_string(),
            assigned_to: None,
            notes: Some("展示用".to_string()),
            metadata: Map::new(),
        },
    )?;

    let stock = vec![
        StockAvailability::new(
            "OAK-BOARD".to_string(),
            Quantity::new(dec!(120), "pcs")?,
            Quantity::new(dec!(10), "pcs")?,
        ),
        StockAvailability::new(
            "TABLE-LEG".to_string(),
            Quantity::new(dec!(100), "pcs")?,
            Quantity::new(dec!(0), "pcs")?,
        ),
        StockAvailability::new(
            "VARNISH".to_string(),
            Quantity::new(dec!(10), "l")?,
            Quantity::new(dec!(0), "l")?,
        ),
    ];

    let plan = controller.plan_requirements(&mo, &bom, &stock)?;
    println!("物料需求:");
    for requirement in plan.requirements() {
        println!(
            "  {:<10} 需求 {:>10}  可用 {:>10}  短缺 {}",
            requirement.component_id,
            requirement.required_quantity.to_string(),
            requirement.available_quantity.to_string(),
            requirement
                .shortfall
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_string())
        );
    }

    // 交期在 12 小時內，自動提升為 Urgent
    let mo = controller.auto_prioritize(&mo)?.unwrap_or(mo);
    println!(
        "優先級 {}，分數 {}",
        mo.priority(),
        controller.service().calculate_priority_score(&mo)
    );

    let operations = vec![
        BomOperation::new("CUT".to_string(), 10, dec!(15), dec!(3)),
        BomOperation::new("ASSEMBLE".to_string(), 20, dec!(10), dec!(6))
            .with_work_center("WC-ASM".to_string())
            .with_efficiency(dec!(0.8)),
    ];
    let minutes = controller
        .service()
        .calculate_estimated_duration(mo.quantity(), &operations)?;
    println!("預估工時 {} 分鐘", minutes);

    let mo = controller.confirm(&mo, &plan)?.order;
    let mo = mo.assign("operator-3")?;
    let mo = controller.start(&mo)?;
    let mo = controller.complete(&mo, true)?;
    println!("製令 {} 狀態 {}", mo.mo_number(), mo.status());

    Ok(())
}
