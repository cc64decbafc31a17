use std::collections::HashMap;

use app_action_core::Expansion;
use app_action_core::env::expand;

fn env() -> HashMap<String, String> {
    HashMap::from([
        ("FOO".to_owned(), "bar".to_owned()),
        ("APP_URL".to_owned(), "baz".to_owned()),
    ])
}

#[test]
fn expands_simple_references() {
    assert_eq!(expand("hello $FOO", &env(), Expansion::Plain), "hello bar");
    assert_eq!(expand("hello ${FOO}!", &env(), Expansion::Plain), "hello bar!");
}

#[test]
fn plain_expansion_blanks_unset_variables() {
    assert_eq!(expand("hello ${FOO.bar}", &env(), Expansion::Plain), "hello ");
    assert_eq!(expand("hello ${APP_DOMAIN}", &env(), Expansion::Plain), "hello ");
}

#[test]
fn retains_component_bindables() {
    assert_eq!(
        expand("hello ${FOO.bar}", &env(), Expansion::RetainBindables),
        "hello ${FOO.bar}"
    );
}

#[test]
fn retains_unset_app_wide_variables() {
    assert_eq!(
        expand("hello ${APP_DOMAIN}", &env(), Expansion::RetainBindables),
        "hello ${APP_DOMAIN}"
    );
}

#[test]
fn app_wide_variables_set_in_env_are_expanded() {
    assert_eq!(
        expand("hello ${APP_URL}", &env(), Expansion::RetainBindables),
        "hello baz"
    );
}

#[test]
fn unset_plain_variables_are_blanked_even_when_retaining() {
    assert_eq!(
        expand("hello ${NOPE}", &env(), Expansion::RetainBindables),
        "hello "
    );
}
