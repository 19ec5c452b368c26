use anyhow::Result;
use bill_split::core::calculator::SUM_TOLERANCE;
use bill_split::domain::model::RowKind;
use bill_split::{calculate, BillSession, SequentialIds, SplitError, SplitValidationError};

fn session() -> BillSession<SequentialIds> {
    BillSession::new(SequentialIds::new("id"))
}

/// 沒有小費或稅時，每人金額加總只差四捨五入
#[test]
fn test_no_fee_split_sums_to_total() -> Result<()> {
    let mut bill = session();
    let ids: Vec<_> = ["a", "b", "c"].iter().map(|n| bill.add_participant(*n)).collect();
    bill.add_item("", 10.0, ids.clone())?;
    bill.add_item("", 7.77, [ids[0].clone(), ids[2].clone()])?;
    bill.set_total(Some(17.77));

    let breakdown = calculate(bill.state())?;

    let sum: f64 = breakdown.output.iter().map(|share| share.amount).sum();
    assert!((sum - 17.77).abs() <= 0.005 * 3.0 + SUM_TOLERANCE);

    let fees = breakdown.row(RowKind::Fees).unwrap();
    assert!(fees.total.abs() < SUM_TOLERANCE);
    Ok(())
}

/// 每個品項的分攤加總等於該品項金額
#[test]
fn test_item_rows_reproduce_item_costs() -> Result<()> {
    let mut bill = session();
    let ids: Vec<_> = ["kelsey", "eric", "taia", "derek", "raji"]
        .iter()
        .map(|n| bill.add_participant(*n))
        .collect();
    bill.add_item("", 15.0, [ids[0].clone(), ids[1].clone()])?;
    bill.add_item("", 10.0, [ids[2].clone(), ids[0].clone()])?;
    bill.add_item("", 40.0, [ids[3].clone(), ids[4].clone(), ids[1].clone(), ids[2].clone()])?;
    bill.add_item("", 1.0, ids.clone())?;
    bill.set_total(Some(500.0));

    let breakdown = calculate(bill.state())?;

    for row in breakdown.item_rows() {
        let shared: f64 = row.values.iter().sum();
        assert!((shared - row.total).abs() < SUM_TOLERANCE, "{}", row.label);
    }

    let proportion: f64 = breakdown.row(RowKind::Proportion).unwrap().values.iter().sum();
    assert!((proportion - 1.0).abs() < SUM_TOLERANCE);

    let split: f64 = breakdown.row(RowKind::Split).unwrap().values.iter().sum();
    assert!((split - 500.0).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_rename_keeps_assignments() -> Result<()> {
    let mut bill = session();
    let a = bill.add_participant("A");
    let b = bill.add_participant("B");
    bill.add_item("", 20.0, [a.clone(), b.clone()])?;
    bill.add_item("", 30.0, [b.clone()])?;
    bill.set_total(Some(50.0));

    bill.rename_participant(&b, "Bea")?;

    let breakdown = calculate(bill.state())?;
    assert_eq!(breakdown.amount_for("B"), None);
    assert_eq!(breakdown.amount_for("Bea"), Some(40.0));
    assert_eq!(breakdown.amount_for("A"), Some(10.0));
    Ok(())
}

#[test]
fn test_removing_only_sharer_blocks_split() -> Result<()> {
    let mut bill = session();
    let a = bill.add_participant("A");
    let b = bill.add_participant("B");
    bill.add_item("", 20.0, [a.clone()])?;
    bill.add_item("", 30.0, [b.clone()])?;
    bill.set_total(Some(50.0));

    bill.remove_participant(&b)?;

    assert_eq!(
        calculate(bill.state()),
        Err(SplitValidationError::UnassignedPositiveCostItem)
    );

    let orphan = bill.state().items[1].id.clone();
    bill.toggle_item_participant(&orphan, &a)?;
    let breakdown = calculate(bill.state())?;
    assert_eq!(breakdown.amount_for("A"), Some(50.0));
    Ok(())
}

#[test]
fn test_duplicate_names_reported_until_renamed() -> Result<()> {
    let mut bill = session();
    let first = bill.add_participant("sam");
    let second = bill.add_participant("sam");
    bill.add_item("", 10.0, [first, second.clone()])?;
    bill.set_total(Some(10.0));

    assert_eq!(
        calculate(bill.state()),
        Err(SplitValidationError::DuplicateParticipantName)
    );

    bill.rename_participant(&second, "Sam")?;
    let breakdown = calculate(bill.state())?;
    assert_eq!(breakdown.amount_for("sam"), Some(5.0));
    assert_eq!(breakdown.amount_for("Sam"), Some(5.0));
    Ok(())
}

#[test]
fn test_edits_to_unknown_entities_are_rejected() -> Result<()> {
    let mut bill = session();
    let a = bill.add_participant("A");
    let item = bill.add_item("", 5.0, [a.clone()])?;
    let version = bill.version();

    bill.remove_item(&item)?;
    assert!(matches!(
        bill.set_item_cost(&item, 3.0),
        Err(SplitError::UnknownEntity { kind: "item", .. })
    ));
    assert!(matches!(
        bill.toggle_item_participant(&item, &a),
        Err(SplitError::UnknownEntity { .. })
    ));
    assert_eq!(bill.version(), version + 1);
    Ok(())
}

#[test]
fn test_overspent_subtotal_then_corrected_total() -> Result<()> {
    let mut bill = session();
    let a = bill.add_participant("A");
    let item = bill.add_item("steak", 60.0, [a])?;
    bill.set_total(Some(50.0));

    assert_eq!(
        calculate(bill.state()),
        Err(SplitValidationError::SubtotalExceedsTotal)
    );

    bill.set_item_cost(&item, 45.0)?;
    let breakdown = calculate(bill.state())?;
    assert_eq!(breakdown.amount_for("A"), Some(50.0));
    assert_eq!(breakdown.item_rows().next().unwrap().label, "steak");
    Ok(())
}

#[test]
fn test_negative_cost_edit_blocks_split_until_fixed() -> Result<()> {
    let mut bill = session();
    let a = bill.add_participant("A");
    let b = bill.add_participant("B");
    bill.add_item("", 20.0, [a])?;
    let refund = bill.add_item("refund", -15.0, [b])?;
    bill.set_total(Some(10.0));

    assert_eq!(
        calculate(bill.state()),
        Err(SplitValidationError::MissingItemCost)
    );

    bill.set_item_cost(&refund, 0.0)?;
    assert!(calculate(bill.state()).is_err());

    bill.set_total(Some(20.0));
    let breakdown = calculate(bill.state())?;
    assert_eq!(breakdown.amount_for("A"), Some(20.0));
    assert_eq!(breakdown.amount_for("B"), Some(0.0));
    Ok(())
}
