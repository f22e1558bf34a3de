use stiff_rs::chemistry::{IONS, meq_l_to_mg_l, mg_l_to_meq_l};
use stiff_rs::{IonSet, RawTable, Unit, normalize};

#[test]
fn mass_equivalent_round_trip_for_every_known_ion() {
    for ion in IONS.iter() {
        for v in [0.003, 1.0, 42.5, 27_713.0] {
            let back = meq_l_to_mg_l(mg_l_to_meq_l(v, ion), ion);
            assert!((back - v).abs() <= 1e-9 * v, "{}: {v} -> {back}", ion.symbol);
            let back = mg_l_to_meq_l(meq_l_to_mg_l(v, ion), ion);
            assert!((back - v).abs() <= 1e-9 * v, "{}: {v} -> {back}", ion.symbol);
        }
    }
}

#[test]
fn canonical_records_satisfy_the_equivalent_weight_identity() {
    let table = RawTable::demo();
    for unit in [Unit::Mass, Unit::Equivalent] {
        let out = normalize(&table, unit, IonSet::Basic).unwrap();
        assert_eq!(out.records.len(), 8);
        for r in &out.records {
            let w = stiff_rs::chemistry::ion_spec(&r.ion).unwrap().equivalent_weight();
            assert!(
                (r.mg_l - r.meq_l * w).abs() <= 1e-9 * r.mg_l.max(1.0),
                "{} under {unit}",
                r.ion
            );
        }
    }
}

#[test]
fn sodium_example_converts_to_about_1205_meq() {
    let table = RawTable::from_triples([("Na", "cation", 27_713.0)]);
    let out = normalize(&table, Unit::Mass, IonSet::Basic).unwrap();
    let meq = out.records[0].meq_l;
    assert!((meq - 1205.45).abs() < 0.5, "unexpected Na meq/L: {meq}");
}
