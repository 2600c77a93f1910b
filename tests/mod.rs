
// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the crate:
// - smoke_tests: the interval and selection rules through the public API
// - catalog_mock: slot sessions driven against mocked catalog and submit collaborators
