//! Native component tests against the in-memory engine.
//!
//! PCB and fan components are created through `ThermalDesign` and edited
//! through the PCB setters on the component handle.

use aedt_boundaries::aedt::boundary::RadiationSide;
use aedt_boundaries::aedt::native::{
    Extents, FanCurve, PartFilter, PartsChoice, PROVIDER, SUBMODEL_DEFINITION_NAME,
};
use aedt_boundaries::aedt::props::{PropertyDictionary, VariationDescriptor, VariationFunction};
use aedt_boundaries::aedt::{
    AedtError, DesignSettings, EngineSession, FanDefinition, InMemoryEngine, NativeComponentKind,
    ObjectState, PcbDefinition, PropValue, Target, ThermalDesign, Units, UpdateOutcome,
    ValidationError,
};

fn design_with(engine: &InMemoryEngine) -> ThermalDesign {
    ThermalDesign::new(EngineSession::new(engine.clone()), DesignSettings::default())
}

fn provider_value(engine: &InMemoryEngine, instance: &str, key: &str) -> Option<PropValue> {
    engine
        .stored_properties(Target::Editor, instance)
        .and_then(|props| props.get_path(&format!("{PROVIDER}::{key}")).cloned())
}

fn fan_curve() -> FanCurve {
    FanCurve::new(vec![0.0, 0.005, 0.01], vec![40.0, 25.0, 0.0])
}

// =============================================================================
// PCB
// =============================================================================

#[test]
fn pcb_instance_is_named_by_engine() {
    let engine = InMemoryEngine::new();
    let design = design_with(&engine);
    let pcb = design
        .create_pcb_component(&PcbDefinition::new("This Project*", "Board"), Some("Board_PCB"))
        .unwrap();

    assert_eq!(pcb.name(), "Board_PCB1");
    assert_eq!(pcb.kind(), NativeComponentKind::Pcb);
    assert!(design.native_component("Board_PCB1").is_some());
    assert_eq!(
        pcb.property(SUBMODEL_DEFINITION_NAME).unwrap(),
        Some(PropValue::from("Board_PCB"))
    );
    assert_eq!(
        pcb.property(&format!("{PROVIDER}::DefnLink::Design")).unwrap(),
        Some(PropValue::from("Board"))
    );

    let call = engine.calls().pop().unwrap();
    assert_eq!(call.target, Target::Editor);
    assert_eq!(call.method, "InsertNativeComponent");
}

#[test]
fn pcb_definition_names_are_unique() {
    let engine = InMemoryEngine::new();
    let design = design_with(&engine);
    let definition = PcbDefinition::new("This Project*", "Board");
    design.create_pcb_component(&definition, Some("PCB_A")).unwrap();
    let calls = engine.call_count();

    let err = design
        .create_pcb_component(&definition, Some("PCB_A"))
        .unwrap_err();
    assert!(matches!(
        err,
        AedtError::Validation(ValidationError::DuplicateName { .. })
    ));
    assert_eq!(engine.call_count(), calls);

    let generated = design.create_pcb_component(&definition, None).unwrap();
    assert!(generated.name().starts_with("PCB_"));
    assert_eq!(design.native_components().len(), 2);
}

#[test]
fn invalid_pcb_definition_is_not_sent() {
    let engine = InMemoryEngine::new();
    let design = design_with(&engine);

    let mut definition = PcbDefinition::new("This Project*", "Board");
    definition.part_filter = Some(PartFilter::default());
    assert!(design.create_pcb_component(&definition, None).is_err());

    let mut definition = PcbDefinition::new("This Project*", "Board");
    definition.extents = Extents::Polygon(String::new());
    assert!(design.create_pcb_component(&definition, None).is_err());

    assert_eq!(engine.call_count(), 0);
}

#[test]
fn pcb_setters_edit_definition() {
    let engine = InMemoryEngine::new();
    let design = design_with(&engine);
    let pcb = design
        .create_pcb_component(&PcbDefinition::new("This Project*", "Board"), Some("PCB_A"))
        .unwrap();

    assert_eq!(pcb.set_resolution(4).unwrap(), UpdateOutcome::Committed);
    assert_eq!(pcb.set_power(3.0).unwrap(), UpdateOutcome::Committed);
    pcb.set_high_side_radiation(&RadiationSide::to_reference(25.0, 0.8))
        .unwrap();

    let instance = pcb.name();
    assert_eq!(
        provider_value(&engine, &instance, "Resolution"),
        Some(PropValue::Number(4.0))
    );
    assert_eq!(
        provider_value(&engine, &instance, "Power"),
        Some(PropValue::from("3W"))
    );
    assert_eq!(
        pcb.property(&format!("{PROVIDER}::HighSide::Ref. Temperature"))
            .unwrap(),
        Some(PropValue::from("25cel"))
    );
    assert_eq!(
        pcb.property(&format!("{PROVIDER}::HighSide::RadiateTo"))
            .unwrap(),
        Some(PropValue::from("RefTemperature"))
    );

    let methods: Vec<_> = engine.calls().into_iter().map(|c| c.method).collect();
    assert_eq!(
        methods.iter().filter(|m| *m == "EditNativeComponentDefinition").count(),
        3
    );
}

#[test]
fn pcb_setters_use_design_units() {
    let engine = InMemoryEngine::new();
    let settings = DesignSettings {
        units: Units {
            temperature: "kel".to_string(),
            power: "mW".to_string(),
            ..Units::default()
        },
        ..DesignSettings::default()
    };
    let design = ThermalDesign::new(EngineSession::new(engine.clone()), settings);
    let mut definition = PcbDefinition::new("This Project*", "Board");
    definition.low_side = RadiationSide::to_reference(300.0, 0.9);
    let pcb = design.create_pcb_component(&definition, Some("PCB_A")).unwrap();

    assert_eq!(
        pcb.property(&format!("{PROVIDER}::LowSide::Ref. Temperature"))
            .unwrap(),
        Some(PropValue::from("300kel"))
    );

    pcb.set_high_side_radiation(&RadiationSide::to_reference(310.0, 0.8))
        .unwrap();
    pcb.set_power(250.0).unwrap();
    assert_eq!(
        pcb.property(&format!("{PROVIDER}::HighSide::Ref. Temperature"))
            .unwrap(),
        Some(PropValue::from("310kel"))
    );
    assert_eq!(
        provider_value(&engine, &pcb.name(), "Power"),
        Some(PropValue::from("250mW"))
    );
}

#[test]
fn pcb_setters_reject_bad_values() {
    let engine = InMemoryEngine::new();
    let design = design_with(&engine);
    let pcb = design
        .create_pcb_component(&PcbDefinition::new("This Project*", "Board"), None)
        .unwrap();
    let calls = engine.call_count();

    assert!(pcb.set_resolution(0).unwrap_err().is_validation());
    assert!(pcb.set_power("Joule Heating").unwrap_err().is_validation());
    let ramp = VariationDescriptor::transient(VariationFunction::Linear, vec!["0", "1"]);
    assert!(pcb.set_power(ramp).unwrap_err().is_validation());
    assert!(pcb
        .set_low_side_radiation(&RadiationSide::to_reference("20cel", 1.5))
        .unwrap_err()
        .is_validation());
    assert!(pcb
        .set_part_filter(Some(&PartFilter::default()))
        .unwrap_err()
        .is_validation());

    assert_eq!(engine.call_count(), calls);
}

#[test]
fn part_filter_needs_imported_parts() {
    let engine = InMemoryEngine::new();
    let design = design_with(&engine);
    let mut definition = PcbDefinition::new("This Project*", "Board");
    definition.parts = PartsChoice::Device;
    let pcb = design.create_pcb_component(&definition, None).unwrap();

    let filter = PartFilter {
        height_threshold: Some("0.5mm".to_string()),
        exclude_capacitors: true,
        ..PartFilter::default()
    };
    pcb.set_part_filter(Some(&filter)).unwrap();
    assert_eq!(
        pcb.property(&format!("{PROVIDER}::Filters::Height::Value"))
            .unwrap(),
        Some(PropValue::from("0.5mm"))
    );
    assert_eq!(
        pcb.property(&format!("{PROVIDER}::Filters::Type::Capacitors"))
            .unwrap(),
        Some(PropValue::Bool(true))
    );

    pcb.set_part_filter(None).unwrap();
    assert_eq!(
        pcb.property(&format!("{PROVIDER}::Filters")).unwrap(),
        None
    );
    assert_eq!(
        pcb.set_part_filter(None).unwrap(),
        UpdateOutcome::Unchanged
    );
}

#[test]
fn update_provider_merges_into_provider() {
    let engine = InMemoryEngine::new();
    let design = design_with(&engine);
    let pcb = design
        .create_pcb_component(&PcbDefinition::new("This Project*", "Board"), None)
        .unwrap();

    pcb.update_provider(PropertyDictionary::new().with("MovePlane", "YZ"))
        .unwrap();
    assert_eq!(
        pcb.property(&format!("{PROVIDER}::MovePlane")).unwrap(),
        Some(PropValue::from("YZ"))
    );
    assert_eq!(
        pcb.property(&format!("{PROVIDER}::Type")).unwrap(),
        Some(PropValue::from("PCB"))
    );
}

// =============================================================================
// Fan
// =============================================================================

#[test]
fn fan_is_created_with_curve() {
    let engine = InMemoryEngine::new();
    let design = design_with(&engine);
    let fan = design
        .create_fan(&FanDefinition::new(20.0, 5.0, fan_curve()), Some("Fan_A"))
        .unwrap();

    assert_eq!(fan.name(), "Fan_A1");
    assert_eq!(fan.kind(), NativeComponentKind::Fan);
    assert_eq!(
        fan.property(&format!("{PROVIDER}::Radius")).unwrap(),
        Some(PropValue::from("20mm"))
    );
    assert!(matches!(
        fan.set_resolution(3),
        Err(AedtError::Validation(ValidationError::InvalidArgument { .. }))
    ));
}

#[test]
fn fan_hub_must_be_smaller_than_radius() {
    let engine = InMemoryEngine::new();
    let design = design_with(&engine);

    let err = design
        .create_fan(&FanDefinition::new("5mm", "5mm", fan_curve()), None)
        .unwrap_err();
    assert!(err.is_validation());

    let curve = FanCurve::new(vec![0.0, 0.01], vec![10.0]);
    let err = design
        .create_fan(&FanDefinition::new(20.0, 5.0, curve), None)
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(engine.call_count(), 0);
}

// =============================================================================
// Deletion
// =============================================================================

#[test]
fn delete_removes_instance() {
    let engine = InMemoryEngine::new();
    let design = design_with(&engine);
    let fan = design
        .create_fan(&FanDefinition::new(20.0, 5.0, fan_curve()), Some("Fan_A"))
        .unwrap();

    fan.delete().unwrap();
    assert_eq!(fan.state(), ObjectState::Deleted);
    assert!(engine.component_names().is_empty());
    assert!(design.native_components().is_empty());
    assert!(matches!(fan.delete(), Err(AedtError::StaleHandle { .. })));

    let call = engine.calls().pop().unwrap();
    assert_eq!(call.method, "Delete");

    // The definition name is free again.
    assert!(design
        .create_fan(&FanDefinition::new(20.0, 5.0, fan_curve()), Some("Fan_A"))
        .is_ok());
}
