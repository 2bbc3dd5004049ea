pub(crate) mod helpers;

mod end_to_end;
