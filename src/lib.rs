pub mod photoexport_core;
