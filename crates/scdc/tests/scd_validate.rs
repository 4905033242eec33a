use serde_json::{json, Value};

use scdc::diagnostics::Severity;
use scdc::model::{ContractModel, MapItemType, ScalarType, TransactionKind, ValueType};
use scdc::validate::{self, codes, validate, ScdError, ValidationError};


fn errors_of(doc: &Value) -> Vec<ValidationError> {
    match validate(doc) {
        Err(ScdError::Invalid(errors)) => errors,
        other => panic!("expected validation errors, got {other:?}"),
    }
}

fn has(errors: &[ValidationError], code: &str, ptr: &str) -> bool {
    errors.iter().any(|e| e.code == code && e.ptr == ptr)
}

#[test]
fn reference_contract_validates_into_model() {
    let model = scd_fixture::model(&scd_fixture::test_contract());

    let info = model.contract_info();
    assert_eq!(info.name, "TestContract");
    assert_eq!(info.description, Some("A test contract"));
    assert_eq!(info.activation_amount, 100_000_000);
    assert_eq!(info.pragmas.max_aux_vars, 3);
    assert!(info.pragmas.verbose_assembly);

    assert_eq!(model.methods().len(), 1);
    assert_eq!(model.methods()[0].code, 100);
    assert_eq!(
        model.methods()[0].args[1].ty,
        ValueType::scalar(ScalarType::Address)
    );

    let vars: Vec<&str> = model.variables().map(|v| v.name.as_str()).collect();
    assert_eq!(vars, vec!["owner"]);
    let structs: Vec<&str> = model.structs().map(|v| v.name.as_str()).collect();
    assert_eq!(structs, vec!["stats"]);
    assert_eq!(model.structs().next().map(|s| s.fields().len()), Some(2));

    assert_eq!(model.maps().len(), 1);
    assert_eq!(model.maps()[0].key1.value, Some(1));
    assert!(model.transactions().is_empty());
}

#[test]
fn empty_object_is_rejected_with_schema_errors() {
    let errors = errors_of(&json!({}));
    assert!(!errors.is_empty());
    assert!(errors.iter().all(|e| e.code == codes::SCHEMA));
}

#[test]
fn non_json_text_is_a_parse_error() {
    match validate("{ \"contractName\": ") {
        Err(ScdError::Parse(err)) => {
            assert_eq!(err.line, 1);
            assert!(!err.message.is_empty());
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn text_and_value_inputs_agree() {
    let doc = scd_fixture::test_contract();
    let text = String::from_utf8(scd_fixture::to_bytes(&doc)).expect("utf8");
    let from_text = validate(text.as_str()).expect("text validates");
    let from_value = validate(&doc).expect("value validates");
    assert_eq!(from_text, from_value);
}

#[test]
fn unknown_properties_are_rejected() {
    let mut doc = scd_fixture::test_contract();
    doc["extra"] = json!(1);
    doc["methods"][0]["payable"] = json!(true);
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::SCHEMA, ""), "{errors:?}");
    assert!(has(&errors, codes::SCHEMA, "/methods/0"), "{errors:?}");
}

#[test]
fn pragma_out_of_range_is_rejected_not_clamped() {
    let mut doc = scd_fixture::test_contract();
    doc["pragmas"]["maxAuxVars"] = json!(11);
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::SCHEMA, "/pragmas/maxAuxVars"), "{errors:?}");
}

#[test]
fn schema_and_name_violations_share_one_batch() {
    let mut doc = scd_fixture::contract(
        "1bad",
        vec![
            scd_fixture::method("sendAmount", "1", &[]),
            scd_fixture::method("sendAmount", "2", &[]),
        ],
        vec![scd_fixture::variable("my-var", "long")],
        vec![scd_fixture::map("m", None), scd_fixture::map("m", None)],
    );
    doc["pragmas"]["maxAuxVars"] = json!(11);
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::SCHEMA, "/pragmas/maxAuxVars"), "{errors:?}");
    assert!(has(&errors, codes::NAME_INVALID, "/contractName"), "{errors:?}");
    assert!(has(&errors, codes::NAME_RESERVED, "/methods/0/name"), "{errors:?}");
    assert!(has(&errors, codes::DUP_NAME, "/methods/1/name"), "{errors:?}");
    assert!(has(&errors, codes::NAME_INVALID, "/variables/0/name"), "{errors:?}");
    assert!(has(&errors, codes::DUP_NAME, "/maps/1/name"), "{errors:?}");

    let ptrs: Vec<&str> = errors.iter().map(|e| e.ptr.as_str()).collect();
    let mut sorted = ptrs.clone();
    sorted.sort();
    assert_eq!(ptrs, sorted);
}

#[test]
fn schema_failures_skip_names_the_schema_already_reports() {
    let mut doc = scd_fixture::test_contract();
    doc["contractName"] = json!("");
    doc["methods"][0]["name"] = json!(7);
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::SCHEMA, "/contractName"), "{errors:?}");
    assert!(has(&errors, codes::SCHEMA, "/methods/0/name"), "{errors:?}");
    assert!(errors.iter().all(|e| e.code == codes::SCHEMA), "{errors:?}");
}

#[test]
fn integral_float_pragmas_are_accepted() {
    let mut doc = scd_fixture::test_contract();
    doc["pragmas"]["maxAuxVars"] = json!(3.0);
    doc["pragmas"]["codeStackPages"] = json!(2.0);
    let desc = validate(&doc).expect("integral floats validate");
    let model = ContractModel::from_validated(desc);
    assert_eq!(model.contract_info().pragmas.max_aux_vars, 3);
    assert_eq!(model.contract_info().pragmas.code_stack_pages, Some(2));

    doc["pragmas"]["maxAuxVars"] = json!(2.5);
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::SCHEMA, "/pragmas/maxAuxVars"), "{errors:?}");
    assert!(errors.iter().all(|e| !e.ptr.is_empty()), "{errors:?}");
}

#[test]
fn numeric_fields_must_be_decimal_strings() {
    let mut doc = scd_fixture::test_contract();
    doc["activationAmount"] = json!(100);
    doc["methods"][0]["code"] = json!("0x10");
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::SCHEMA, "/activationAmount"), "{errors:?}");
    assert!(has(&errors, codes::SCHEMA, "/methods/0/code"), "{errors:?}");
}

#[test]
fn identifiers_must_be_c_names() {
    let doc = scd_fixture::contract(
        "Bad",
        vec![scd_fixture::method("my-method", "1", &[])],
        vec![scd_fixture::variable("2fast", "long")],
        Vec::new(),
    );
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::NAME_INVALID, "/methods/0/name"), "{errors:?}");
    assert!(has(&errors, codes::NAME_INVALID, "/variables/0/name"), "{errors:?}");

    let mut doc = scd_fixture::test_contract();
    doc["contractName"] = json!("Test Contract");
    assert!(has(&errors_of(&doc), codes::NAME_INVALID, "/contractName"));
}

#[test]
fn reserved_words_and_skeleton_symbols_are_rejected() {
    let doc = scd_fixture::contract(
        "Reserved",
        vec![scd_fixture::method("main", "1", &[("long", "long")])],
        vec![
            scd_fixture::variable("while", "long"),
            scd_fixture::variable("currentTx", "long"),
        ],
        Vec::new(),
    );
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::NAME_RESERVED, "/methods/0/name"), "{errors:?}");
    assert!(has(&errors, codes::NAME_RESERVED, "/methods/0/args/0/name"), "{errors:?}");
    assert!(has(&errors, codes::NAME_RESERVED, "/variables/0/name"), "{errors:?}");
    assert!(has(&errors, codes::NAME_RESERVED, "/variables/1/name"), "{errors:?}");
}

#[test]
fn builtin_function_names_are_rejected() {
    let doc = scd_fixture::contract(
        "Builtins",
        vec![scd_fixture::method(
            "sendAmount",
            "1",
            &[("amount", "amount"), ("getBlockheight", "long")],
        )],
        vec![
            scd_fixture::variable("getCurrentBalance", "long"),
            scd_fixture::struct_var("sendMessage", &[("getAmount", "long")]),
        ],
        Vec::new(),
    );
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::NAME_RESERVED, "/methods/0/name"), "{errors:?}");
    assert!(has(&errors, codes::NAME_RESERVED, "/methods/0/args/1/name"), "{errors:?}");
    assert!(!has(&errors, codes::NAME_RESERVED, "/methods/0/args/0/name"), "{errors:?}");
    assert!(has(&errors, codes::NAME_RESERVED, "/variables/0/name"), "{errors:?}");
    assert!(has(&errors, codes::NAME_RESERVED, "/variables/1/name"), "{errors:?}");
    assert!(has(&errors, codes::NAME_RESERVED, "/variables/1/fields/0/name"), "{errors:?}");
}

#[test]
fn duplicate_method_codes_are_rejected() {
    let doc = scd_fixture::contract(
        "Dup",
        vec![
            scd_fixture::method("deposit", "100", &[]),
            scd_fixture::method("withdraw", "100", &[]),
        ],
        Vec::new(),
        Vec::new(),
    );
    let errors = errors_of(&doc);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(has(&errors, codes::DUP_CODE, "/methods/1/code"));
}

#[test]
fn methods_and_variables_share_one_namespace() {
    let doc = scd_fixture::contract(
        "Dup",
        vec![scd_fixture::method("total", "1", &[])],
        vec![scd_fixture::variable("total", "long")],
        Vec::new(),
    );
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::DUP_NAME, "/variables/0/name"), "{errors:?}");
}

#[test]
fn duplicate_args_and_fields_are_rejected() {
    let doc = scd_fixture::contract(
        "Dup",
        vec![scd_fixture::method("pay", "1", &[("to", "address"), ("to", "long")])],
        vec![scd_fixture::struct_var("pair", &[("a", "long"), ("a", "long")])],
        Vec::new(),
    );
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::DUP_NAME, "/methods/0/args/1/name"), "{errors:?}");
    assert!(has(&errors, codes::DUP_NAME, "/variables/0/fields/1/name"), "{errors:?}");
}

#[test]
fn identifiers_may_not_collide_with_generated_constants() {
    let doc = scd_fixture::contract(
        "Clash",
        vec![scd_fixture::method("fee", "1", &[])],
        vec![scd_fixture::variable("FEE", "long")],
        Vec::new(),
    );
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::DUP_SYMBOL, "/variables/0/name"), "{errors:?}");

    let doc = scd_fixture::contract(
        "Clash",
        vec![scd_fixture::method("Stats", "1", &[])],
        vec![scd_fixture::struct_var("stats", &[("n", "long")])],
        Vec::new(),
    );
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::DUP_SYMBOL, "/variables/0/name"), "{errors:?}");
}

#[test]
fn struct_named_like_tx_tag_is_rejected() {
    let doc = scd_fixture::contract(
        "Clash",
        Vec::new(),
        vec![scd_fixture::struct_var("tx", &[("n", "long")])],
        Vec::new(),
    );
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::DUP_SYMBOL, "/variables/0/name"), "{errors:?}");
}

#[test]
fn struct_shape_rules() {
    let mut nested = scd_fixture::struct_var("outer", &[]);
    nested["fields"] = json!([{ "name": "inner", "type": "struct" }]);
    let mut scalar_with_fields = scd_fixture::variable("plain", "long");
    scalar_with_fields["fields"] = json!([{ "name": "x", "type": "long" }]);

    let doc = scd_fixture::contract(
        "Shapes",
        Vec::new(),
        vec![
            nested,
            scd_fixture::struct_var("empty", &[]),
            scalar_with_fields,
        ],
        Vec::new(),
    );
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::STRUCT_NESTED, "/variables/0/fields/0/type"), "{errors:?}");
    assert!(has(&errors, codes::STRUCT_FIELDS, "/variables/1"), "{errors:?}");
    assert!(has(&errors, codes::STRUCT_FIELDS, "/variables/2/fields"), "{errors:?}");
}

#[test]
fn methods_take_at_most_three_args() {
    let doc = scd_fixture::contract(
        "Args",
        vec![scd_fixture::method(
            "many",
            "1",
            &[("a", "long"), ("b", "long"), ("c", "long"), ("d", "long")],
        )],
        Vec::new(),
        Vec::new(),
    );
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::METHOD_ARGS, "/methods/0/args"), "{errors:?}");
}

#[test]
fn method_codes_must_fit_a_positive_signed_word() {
    for code in ["0", "9223372036854775808", "18446744073709551616"] {
        let doc = scd_fixture::contract(
            "Codes",
            vec![scd_fixture::method("run", code, &[])],
            Vec::new(),
            Vec::new(),
        );
        let errors = errors_of(&doc);
        assert!(has(&errors, codes::INT_RANGE, "/methods/0/code"), "{code}: {errors:?}");
    }

    let doc = scd_fixture::contract(
        "Codes",
        vec![scd_fixture::method("run", "9223372036854775807", &[])],
        Vec::new(),
        Vec::new(),
    );
    assert!(validate(&doc).is_ok());
}

#[test]
fn constant_literals_are_checked_against_their_type() {
    let mut missing = scd_fixture::constant("fee", "long", "1");
    missing.as_object_mut().expect("object").remove("value");

    let doc = scd_fixture::contract(
        "Literals",
        Vec::new(),
        vec![
            scd_fixture::constant("fee", "long", "abc"),
            scd_fixture::constant("flag", "boolean", "yes"),
            scd_fixture::constant("label", "string", "much too long"),
            missing,
            scd_fixture::constant("list", "long[]", "1"),
        ],
        Vec::new(),
    );
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::VAR_BAD_LITERAL, "/variables/0/value"), "{errors:?}");
    assert!(has(&errors, codes::VAR_BAD_LITERAL, "/variables/1/value"), "{errors:?}");
    assert!(has(&errors, codes::VAR_BAD_LITERAL, "/variables/2/value"), "{errors:?}");
    assert!(has(&errors, codes::VAR_MISSING_VALUE, "/variables/3"), "{errors:?}");
    assert!(has(&errors, codes::VAR_BAD_LITERAL, "/variables/4"), "{errors:?}");
    // the duplicated "fee" name is reported too
    assert!(has(&errors, codes::DUP_NAME, "/variables/3/name"), "{errors:?}");
}

#[test]
fn map_item_rules() {
    let mut doc = scd_fixture::contract(
        "Maps",
        Vec::new(),
        Vec::new(),
        vec![scd_fixture::map("balances", None), scd_fixture::map("balances", None)],
    );
    doc["maps"][0]["key2"]["constant"] = json!(true);
    doc["maps"][0]["value"] = json!({ "name": "state", "type": "enum" });
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::MAP_MISSING_VALUE, "/maps/0/key2"), "{errors:?}");
    assert!(has(&errors, codes::MAP_ENUM, "/maps/0/value"), "{errors:?}");
    assert!(has(&errors, codes::DUP_NAME, "/maps/1/name"), "{errors:?}");
}

#[test]
fn enum_map_items_lower_into_entries() {
    let mut doc = scd_fixture::test_contract();
    doc["maps"][0]["value"] = json!({
        "name": "status",
        "type": "enum",
        "oneOf": [
            { "name": "OPEN", "value": "1" },
            { "name": "CLOSED", "value": "2" },
        ],
    });
    let model = scd_fixture::model(&doc);
    let value = &model.maps()[0].value;
    assert!(matches!(value.ty, Some(MapItemType::Enum(_))));
    let names: Vec<(&str, u64)> = value
        .enum_entries()
        .iter()
        .map(|e| (e.name.as_str(), e.value))
        .collect();
    assert_eq!(names, vec![("OPEN", 1), ("CLOSED", 2)]);
}

#[test]
fn contract_description_must_be_single_line() {
    let mut doc = scd_fixture::test_contract();
    doc["description"] = json!("line one\nline two");
    let errors = errors_of(&doc);
    assert!(has(&errors, codes::TEXT_MULTILINE, "/description"), "{errors:?}");
}

#[test]
fn errors_are_reported_as_one_sorted_batch() {
    let doc = scd_fixture::contract(
        "Batch",
        vec![
            scd_fixture::method("a", "5", &[]),
            scd_fixture::method("b", "5", &[]),
        ],
        vec![
            scd_fixture::variable("if", "long"),
            scd_fixture::constant("c", "long", "x"),
        ],
        Vec::new(),
    );
    let errors = errors_of(&doc);
    assert_eq!(errors.len(), 3, "{errors:?}");
    let ptrs: Vec<&str> = errors.iter().map(|e| e.ptr.as_str()).collect();
    let mut sorted = ptrs.clone();
    sorted.sort();
    assert_eq!(ptrs, sorted);

    let err = ScdError::Invalid(errors);
    assert_eq!(err.diagnostics().len(), 3);
    assert!(err.to_string().starts_with("invalid SCD (3 error(s))"));
}

#[test]
fn transactions_are_kept_in_order() {
    let mut doc = scd_fixture::test_contract();
    doc["transactions"] = json!([
        { "name": "payout", "kind": "sendAmount" },
        { "name": "notify", "kind": "sendMessage", "description": "ping the owner" },
    ]);
    let model = scd_fixture::model(&doc);
    let kinds: Vec<TransactionKind> = model.transactions().iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TransactionKind::SendAmount, TransactionKind::SendMessage]
    );
}

#[test]
fn canonical_json_revalidates_to_equal_description() {
    let desc = validate(&scd_fixture::test_contract()).expect("validates");
    let again = validate(&desc.to_json_value()).expect("canonical form validates");
    assert_eq!(desc, again);

    let serialized = serde_json::to_value(&desc).expect("serialize");
    assert_eq!(serialized, desc.to_json_value());
}

#[test]
fn advisories_flag_what_the_skeleton_drops() {
    let mut doc = scd_fixture::contract(
        "Advice",
        vec![scd_fixture::method("push", "1", &[("items", "long[]")])],
        vec![scd_fixture::variable("history", "txId[]")],
        vec![scd_fixture::map("ledger", None)],
    );
    doc["variables"]
        .as_array_mut()
        .expect("array")
        .push(json!({ "name": "seed", "type": "long", "initializable": true, "value": "7" }));

    let model: ContractModel = scd_fixture::model(&doc);
    let advisories = validate::advisories(&model);
    assert!(advisories.iter().all(|d| d.severity == Severity::Warning));

    let codes_found: Vec<&str> = advisories.iter().map(|d| d.code.as_str()).collect();
    assert!(codes_found.contains(&codes::ADV_NO_MAP_CONSTANT));
    assert!(codes_found.contains(&codes::ADV_UNUSED_VALUE));
    assert_eq!(
        codes_found
            .iter()
            .filter(|c| **c == codes::ADV_ARRAY_AS_LONG)
            .count(),
        2
    );

    assert!(validate::advisories(&scd_fixture::model(&scd_fixture::test_contract())).is_empty());
}

#[test]
fn demo_description_is_valid_and_canonical() {
    let text = include_str!("../../../demos/counter.scd.json");
    let desc = validate(text).expect("demo validates");
    let formatted =
        scdc::util::canonical_pretty_json_bytes(&desc.to_json_value()).expect("format");
    assert_eq!(String::from_utf8(formatted).expect("utf8"), text);
}
