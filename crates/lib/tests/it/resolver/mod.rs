mod cache;
mod references;
mod values;
