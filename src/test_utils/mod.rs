#![allow(missing_docs)]

pub(crate) mod backend;
pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use backend::{
    REFRESHED_ACCESS_TOKEN, Recorder, VALID_ACCESS_TOKEN, VALID_REFRESH_TOKEN, access_token,
    bad_request, log_in_route, spawn_backend, test_client, test_session, test_state,
};
pub(crate) use form::{
    assert_form_error_message, assert_form_input, assert_form_input_with_value,
    assert_form_submit_button, assert_hx_endpoint, must_get_form,
};
pub(crate) use html::{
    assert_valid_html, count_elements, element_text, must_select, parse_html_document,
    parse_html_fragment,
};
pub(crate) use http::{assert_content_type, assert_hx_redirect, assert_status_ok, get_header};
