mod common;

mod movement_tests;
