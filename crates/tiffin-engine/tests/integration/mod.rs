mod assignment_flow;
mod persistence;
mod subscription_flow;
